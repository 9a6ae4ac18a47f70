//! Dark/light theme toggle.

use dioxus::prelude::*;

use crate::app::session::use_session;

pub const THEMES: [&str; 2] = ["dark", "light"];

/// Point Pico's `data-theme` at `theme`.
pub fn apply_theme(theme: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            let _ = root.set_attribute("data-theme", theme);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = theme;
}

/// Footer switcher; the choice is stored with the rest of the session.
#[component]
pub fn ThemeSwitcher() -> Element {
    let mut session = use_session();
    let current = session
        .read()
        .theme
        .clone()
        .unwrap_or_else(|| "dark".to_string());

    rsx! {
        div { class: "theme-switcher",
            for theme in THEMES {
                button {
                    key: "{theme}",
                    id: "theme-{theme}",
                    class: if current == theme { "active" } else { "" },
                    onclick: move |_| {
                        session.write().set_theme(theme);
                        apply_theme(theme);
                    },
                    if theme == "dark" { "Dark" } else { "Light" }
                }
            }
        }
    }
}

/// Client-side JavaScript for initial theme setup (included in head).
/// Runs immediately to prevent flash of wrong theme.
pub const THEME_SCRIPT: &str = r#"
(function(){
    const t = localStorage.getItem('theme') === 'light' ? 'light' : 'dark';
    document.documentElement.setAttribute('data-theme', t);
})();
"#;

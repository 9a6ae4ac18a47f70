//! First-run wizard: profile, city, preferences.

use dioxus::prelude::*;
use flowguard_model::auth::{role_description, DEFAULT_ROLE, ROLES};
use flowguard_model::{MessageResponse, ProfileUpdate};

use crate::app::api::post_json;
use crate::app::components::theme::apply_theme;
use crate::app::components::Layout;
use crate::app::notify::use_notifier;
use crate::app::session::{use_session, ALL_CITIES};
use crate::app::timer::sleep;
use crate::app::Route;

const TOTAL_STEPS: u8 = 3;

pub const CITIES: [&str; 7] = [
    "Bangalore",
    "Mumbai",
    "Delhi",
    "Chennai",
    "Hyderabad",
    "Pune",
    ALL_CITIES,
];

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[component]
pub fn Onboarding() -> Element {
    let mut session = use_session();
    let mut notifier = use_notifier();
    let nav = use_navigator();

    let mut step = use_signal(|| 1u8);
    let mut display_name = use_signal(String::new);
    let mut role = use_signal(|| DEFAULT_ROLE.to_string());
    let mut city = use_signal(String::new);
    let mut theme = use_signal(|| "dark".to_string());
    let mut notifs = use_signal(|| true);

    // Pre-fill from whatever is already stored
    use_effect(move || {
        let s = session.read();
        if s.loaded {
            if let Some(name) = &s.username {
                display_name.set(name.clone());
            }
            if let Some(r) = &s.role {
                role.set(r.clone());
            }
            if let Some(c) = &s.city {
                city.set(c.clone());
            }
        }
    });

    let mut finish = move || {
        let name = non_empty(&display_name());
        let chosen_city = city().trim().to_string();
        let chosen_role = role();
        let chosen_theme = theme();

        {
            let mut s = session.write();
            let username = name
                .clone()
                .unwrap_or_else(|| s.display_name().to_string());
            s.finish_onboarding(
                username,
                chosen_role.clone(),
                chosen_city.clone(),
                chosen_theme.clone(),
                notifs(),
            );
        }
        apply_theme(&chosen_theme);

        let update = ProfileUpdate {
            user_id: session.read().user_id.clone().unwrap_or_default(),
            display_name: name,
            city: Some(chosen_city),
            role: Some(chosen_role),
            theme: Some(chosen_theme),
        };

        spawn(async move {
            notifier.show_loading("Saving your preferences...");
            // Preferences are already stored locally
            if let Err(e) = post_json::<_, MessageResponse>("/profile/update", &update).await {
                tracing::debug!("Profile update not saved: {}", e);
            }
            notifier.hide_loading();
            notifier.success("Setup complete! Welcome aboard.");
            sleep(800).await;
            let _ = nav.push(Route::Dashboard {});
        });
    };

    let mut next = move || {
        let current = step();
        if current == 2 && city().trim().is_empty() {
            notifier.error("Please choose your city.");
            return;
        }
        if current == TOTAL_STEPS {
            finish();
        } else {
            step.set(current + 1);
        }
    };

    let current = step();
    let next_label = if current == TOTAL_STEPS {
        "Finish Setup \u{25C8}"
    } else {
        "Continue \u{2192}"
    };

    rsx! {
        Layout {
            title: "Setup".to_string(),
            nav_active: String::new(),
            show_nav: false,

            article { class: "card p-6", style: "max-width:560px;margin:3rem auto;",
                h1 { class: "text-2xl font-bold mb-6", "Welcome to FlowGuard" }
                div { class: "steps",
                    for i in 1..=TOTAL_STEPS {
                        div { key: "{i}", class: if i <= current { "step done" } else { "step" } }
                    }
                }

                {match current {
                    1 => rsx! {
                        h3 { "Your profile" }
                        label { "Display name"
                            input { value: "{display_name}", oninput: move |e| display_name.set(e.value()) }
                        }
                        label { "Role"
                            select { value: "{role}", onchange: move |e| role.set(e.value()),
                                for (r, _) in ROLES {
                                    option { key: "{r}", value: "{r}", selected: role() == r, "{r}" }
                                }
                            }
                        }
                        small { "{role_description(&role())}" }
                    },
                    2 => rsx! {
                        h3 { "Your city" }
                        div { class: "chips",
                            for c in CITIES {
                                button {
                                    key: "{c}",
                                    class: if city() == c { "chip active" } else { "chip outline" },
                                    onclick: move |_| city.set(c.to_string()),
                                    "{c}"
                                }
                            }
                        }
                        label { "Or type a city"
                            input { value: "{city}", placeholder: "e.g. Kochi", oninput: move |e| city.set(e.value()) }
                        }
                    },
                    _ => rsx! {
                        h3 { "Preferences" }
                        div { class: "chips",
                            for t in ["dark", "light"] {
                                button {
                                    key: "{t}",
                                    class: if theme() == t { "chip active" } else { "chip outline" },
                                    onclick: move |_| theme.set(t.to_string()),
                                    if t == "dark" { "\u{263E} Dark" } else { "\u{2600} Light" }
                                }
                            }
                        }
                        label {
                            input { r#type: "checkbox", role: "switch", checked: notifs(),
                                onchange: move |_| notifs.toggle() }
                            " Congestion alert notifications"
                        }
                    },
                }}

                div { style: "display:flex;justify-content:space-between;margin-top:1.5rem;",
                    if current > 1 {
                        button { class: "secondary", onclick: move |_| step.set(current - 1), "\u{2190} Back" }
                    } else {
                        span {}
                    }
                    button { onclick: move |_| next(), "{next_label}" }
                }
            }
        }
    }
}

//! Navigation component using Tailwind CSS.

use dioxus::prelude::*;

use crate::app::session::use_session;
use crate::app::Route;

/// `(id, label, icon)` of every protected page, in menu order.
pub const NAV_LINKS: [(&str, &str, &str); 7] = [
    ("dashboard", "Dashboard", "\u{2B21}"),
    ("predict", "Predict", "\u{25C8}"),
    ("history", "History", "\u{25F7}"),
    ("add-traffic", "Add Traffic", "\u{25C9}"),
    ("alerts", "Alerts", "\u{25EC}"),
    ("roads", "Roads", "\u{25EB}"),
    ("compare", "Compare", "\u{25E7}"),
];

fn route_for(id: &str) -> Route {
    match id {
        "predict" => Route::Predict {
            road: String::new(),
        },
        "history" => Route::History {},
        "add-traffic" => Route::AddTraffic {},
        "alerts" => Route::Alerts {},
        "roads" => Route::Roads {},
        "compare" => Route::Compare {},
        _ => Route::Dashboard {},
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct NavProps {
    /// The currently active page ID (e.g., "dashboard", "roads")
    pub active: String,
}

/// Navigation bar using Tailwind CSS with mobile toggle.
#[component]
pub fn Nav(props: NavProps) -> Element {
    let mut menu_open = use_signal(|| false);
    let mut session = use_session();
    let nav = use_navigator();

    let nav_link_class = |page: &str| {
        if props.active == page {
            "nav-link active block px-3 py-2 rounded-md text-sm font-medium text-white bg-gray-900"
        } else {
            "nav-link block px-3 py-2 rounded-md text-sm font-medium text-gray-300 hover:text-white hover:bg-gray-700"
        }
    };

    let mobile_menu_class = if menu_open() {
        "block lg:hidden"
    } else {
        "hidden lg:hidden"
    };

    let (city, initial, username) = {
        let s = session.read();
        (
            s.city_label().to_string(),
            s.initial(),
            s.display_name().to_string(),
        )
    };

    let logout = move |_| {
        session.write().clear();
        let _ = nav.replace(Route::Login {});
    };

    rsx! {
        nav { class: "navbar bg-gray-800",
            div { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8",
                div { class: "flex items-center justify-between h-16",
                    // Logo / Brand
                    div { class: "flex items-center",
                        Link { class: "navbar-brand text-white font-bold text-xl", to: Route::Dashboard {},
                            span { class: "navbar-logo", "\u{2B21}" }
                            span { class: "navbar-title", "FLOWGUARD" }
                        }
                    }

                    // Desktop navigation
                    div { class: "hidden lg:flex items-center space-x-4",
                        for (id, label, icon) in NAV_LINKS {
                            Link { key: "{id}", class: nav_link_class(id), to: route_for(id),
                                span { class: "nav-icon", "{icon}" }
                                span { "{label}" }
                            }
                        }
                    }

                    div { class: "navbar-right flex items-center gap-3",
                        Link { class: "navbar-city", to: Route::Onboarding {}, title: "Change city",
                            "\u{1F3D9}\u{FE0F} {city}"
                        }
                        div { class: "navbar-user",
                            div { class: "navbar-avatar", "{initial}" }
                            span { class: "navbar-username", "{username}" }
                        }
                        button { class: "navbar-logout", title: "Sign Out", onclick: logout, "\u{238B} Out" }

                        // Mobile menu button
                        div { class: "lg:hidden",
                            button {
                                class: "inline-flex items-center justify-center p-2 rounded-md text-gray-400 hover:text-white hover:bg-gray-700 focus:outline-none",
                                r#type: "button",
                                onclick: move |_| menu_open.toggle(),
                                span { class: "sr-only", "Toggle menu" }
                                if menu_open() {
                                    // X icon
                                    svg { class: "h-6 w-6", fill: "none", view_box: "0 0 24 24", stroke: "currentColor", "stroke-width": "2",
                                        path { "stroke-linecap": "round", "stroke-linejoin": "round", d: "M6 18L18 6M6 6l12 12" }
                                    }
                                } else {
                                    // Hamburger icon
                                    svg { class: "h-6 w-6", fill: "none", view_box: "0 0 24 24", stroke: "currentColor", "stroke-width": "2",
                                        path { "stroke-linecap": "round", "stroke-linejoin": "round", d: "M4 6h16M4 12h16M4 18h16" }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            // Mobile menu
            div { class: "{mobile_menu_class}", id: "mobile-menu",
                div { class: "px-2 pt-2 pb-3 space-y-1",
                    for (id, label, icon) in NAV_LINKS {
                        Link {
                            key: "m-{id}",
                            class: nav_link_class(id),
                            to: route_for(id),
                            onclick: move |_| menu_open.set(false),
                            "{icon} {label}"
                        }
                    }
                }
            }
        }
    }
}

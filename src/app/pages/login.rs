//! Sign-in / registration page.

use dioxus::prelude::*;
use dioxus::router::Navigator;
use flowguard_model::auth::{role_description, DEFAULT_ROLE, ROLES};
use flowguard_model::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};

use crate::app::api::post_json;
use crate::app::components::Layout;
use crate::app::format::clock_text;
use crate::app::notify::{use_notifier, Notifier};
use crate::app::session::{use_session, Session};
use crate::app::timer::{sleep, use_clock};
use crate::app::Route;

const MIN_PASSWORD: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Login,
    Register,
}

/// Registration form checks, in the order they are reported.
fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), &'static str> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("Please fill all required fields.");
    }
    if password.chars().count() < MIN_PASSWORD {
        return Err("Password must be at least 6 characters.");
    }
    if password != confirm {
        return Err("Passwords do not match.");
    }
    Ok(())
}

/// Part of the address before `@`.
fn email_name(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

fn epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Backend unreachable: sign in locally and carry on with demo data.
async fn demo_login(
    mut session: Signal<Session>,
    mut notifier: Notifier,
    nav: Navigator,
    email: &str,
    name: Option<String>,
    role: Option<String>,
) {
    notifier.demo_mode();
    let username = name
        .filter(|n| !n.is_empty())
        .or_else(|| Some(email_name(email)).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| "Demo User".to_string());
    session.write().sign_in(
        format!("demo-{}", epoch_ms()),
        username,
        role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
    );
    notifier.success("Demo mode activated \u{2014} redirecting...");
    sleep(1000).await;
    let _ = nav.push(Route::Onboarding {});
}

/// Login page component.
#[component]
pub fn Login() -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let nav = use_navigator();
    let clock = use_clock();

    let mut tab = use_signal(|| Tab::Login);
    let mut login_email = use_signal(String::new);
    let mut login_password = use_signal(String::new);
    let mut reg_name = use_signal(String::new);
    let mut reg_email = use_signal(String::new);
    let mut reg_password = use_signal(String::new);
    let mut reg_confirm = use_signal(String::new);
    let mut reg_role = use_signal(|| DEFAULT_ROLE.to_string());

    // Already signed in
    use_effect(move || {
        let s = session.read();
        if s.loaded && s.is_signed_in() {
            let dest = if s.needs_onboarding() {
                Route::Onboarding {}
            } else {
                Route::Dashboard {}
            };
            let _ = nav.replace(dest);
        }
    });

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let mut notifier = notifier;
        let mut session = session;
        let email = login_email().trim().to_string();
        let password = login_password();
        if email.is_empty() || password.is_empty() {
            notifier.error("Please enter email and password.");
            return;
        }

        spawn(async move {
            notifier.show_loading("Authenticating...");
            let result = post_json::<_, LoginResponse>(
                "/login",
                &LoginRequest {
                    email: email.clone(),
                    password,
                },
            )
            .await;
            notifier.hide_loading();

            match result {
                Ok(user) => {
                    let name = if user.name.is_empty() {
                        email_name(&email)
                    } else {
                        user.name.clone()
                    };
                    let role = if user.role.is_empty() {
                        DEFAULT_ROLE.to_string()
                    } else {
                        user.role
                    };
                    session.write().sign_in(user.id.to_string(), name.clone(), role);
                    notifier.success(format!("Welcome back, {}!", name));
                    let dest = if session.read().needs_onboarding() {
                        Route::Onboarding {}
                    } else {
                        Route::Dashboard {}
                    };
                    sleep(600).await;
                    let _ = nav.push(dest);
                }
                Err(e) if e.is_offline() => {
                    demo_login(session, notifier, nav, &email, None, None).await;
                }
                Err(e) => notifier.error(e.user_message("Invalid credentials.")),
            }
        });
    };

    let handle_register = move |evt: FormEvent| {
        evt.prevent_default();
        let mut notifier = notifier;
        let mut session = session;
        let name = reg_name().trim().to_string();
        let email = reg_email().trim().to_string();
        let password = reg_password();
        let role = reg_role();
        if let Err(msg) = validate_registration(&name, &email, &password, &reg_confirm()) {
            notifier.error(msg);
            return;
        }

        spawn(async move {
            notifier.show_loading("Creating your account...");
            let result = post_json::<_, MessageResponse>(
                "/register",
                &RegisterRequest {
                    name: name.clone(),
                    email: email.clone(),
                    password,
                    role: Some(role.clone()),
                },
            )
            .await;
            notifier.hide_loading();

            match result {
                Ok(created) => {
                    notifier.success("Account created! Logging you in...");
                    let user_id = created
                        .id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| format!("new-{}", epoch_ms()));
                    session.write().sign_in(user_id, name, role);
                    sleep(800).await;
                    let _ = nav.push(Route::Onboarding {});
                }
                Err(e) if e.is_offline() => {
                    demo_login(session, notifier, nav, &email, Some(name), Some(role)).await;
                }
                Err(e) => notifier.error(e.user_message("Registration failed. Try again.")),
            }
        });
    };

    let (title, subtitle) = match tab() {
        Tab::Login => ("SIGN IN", "Access your traffic intelligence dashboard"),
        Tab::Register => ("CREATE ACCOUNT", "Join the traffic intelligence platform"),
    };
    let time = clock().map(clock_text).unwrap_or_default();
    let tab_class = |t: Tab| if tab() == t { "chip active" } else { "chip outline" };

    rsx! {
        Layout {
            title: "Sign In".to_string(),
            nav_active: String::new(),
            protected: false,
            show_nav: false,

            article { class: "card p-6", style: "max-width:460px;margin:3rem auto;",
                div { class: "page-header",
                    div {
                        h1 { class: "text-2xl font-bold", "\u{2B21} {title}" }
                        p { class: "text-muted text-sm", "{subtitle}" }
                    }
                    span { class: "page-clock", "{time}" }
                }

                div { class: "chips",
                    button { id: "tab-login", class: tab_class(Tab::Login), onclick: move |_| tab.set(Tab::Login), "Sign In" }
                    button { id: "tab-register", class: tab_class(Tab::Register), onclick: move |_| tab.set(Tab::Register), "Register" }
                }

                if tab() == Tab::Login {
                    form { id: "form-login", onsubmit: handle_login,
                        label { "Email"
                            input { r#type: "email", placeholder: "you@city.gov", value: "{login_email}",
                                oninput: move |e| login_email.set(e.value()) }
                        }
                        label { "Password"
                            input { r#type: "password", value: "{login_password}",
                                oninput: move |e| login_password.set(e.value()) }
                        }
                        button { r#type: "submit", "Sign In \u{2192}" }
                    }
                } else {
                    form { id: "form-register", onsubmit: handle_register,
                        label { "Full name"
                            input { value: "{reg_name}", oninput: move |e| reg_name.set(e.value()) }
                        }
                        label { "Email"
                            input { r#type: "email", value: "{reg_email}", oninput: move |e| reg_email.set(e.value()) }
                        }
                        div { class: "grid",
                            label { "Password"
                                input { r#type: "password", value: "{reg_password}",
                                    oninput: move |e| reg_password.set(e.value()) }
                            }
                            label { "Confirm"
                                input { r#type: "password", value: "{reg_confirm}",
                                    oninput: move |e| reg_confirm.set(e.value()) }
                            }
                        }
                        label { "Role"
                            select { value: "{reg_role}", onchange: move |e| reg_role.set(e.value()),
                                for (role, _) in ROLES {
                                    option { key: "{role}", value: "{role}", selected: reg_role() == role, "{role}" }
                                }
                            }
                        }
                        small { id: "roleDesc", "{role_description(&reg_role())}" }
                        button { r#type: "submit", "Create Account \u{2192}" }
                    }
                }
            }
        }
    }
}

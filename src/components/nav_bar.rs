use dioxus::prelude::*;
use crate::backend::AppCmd;
use crate::components::common::{ErrorBanner, Spinner};
use crate::components::{send, AppState, CmdSender};
use crate::Route;

/// Dashboard shell around every protected view. Sends signed-out users back
/// to the login view once the stored session has been read.
#[component]
pub fn NavComponent() -> Element {
    let cmd_tx = use_context::<CmdSender>();
    let mut app_state = use_context::<AppState>();
    let navigator = use_navigator();

    use_effect(move || {
        if (app_state.session_restored)() && !app_state.is_authenticated() {
            navigator.replace(Route::LoginComponent {});
        }
    });

    if !(app_state.session_restored)() || !app_state.is_authenticated() {
        return rsx! { Spinner {} };
    }

    let email = app_state.user_email();
    let notice = app_state.notice.read().clone();

    rsx! {
        div { class: "dashboard",
            aside { class: "sidebar",
                h3 { class: "logo-text", "SmartPol" }
                nav { class: "sidebar-links",
                    Link { to: Route::HomeComponent {}, class: "nav-link", active_class: "active", "Inicio" }
                    Link { to: Route::PersonasComponent {}, class: "nav-link", active_class: "active", "Personas" }
                    Link { to: Route::ReportesComponent {}, class: "nav-link", active_class: "active", "Reportes" }
                }
            }

            div { class: "dashboard-main",
                header { class: "top-bar",
                    span { class: "top-bar-email", "{email}" }
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| send(&cmd_tx, AppCmd::Logout),
                        "Cerrar sesión"
                    }
                }
                if let Some(message) = notice {
                    ErrorBanner {
                        message,
                        on_dismiss: move |_| app_state.notice.set(None),
                    }
                }
                main { class: "dashboard-content",
                    Outlet::<Route> {}
                }
            }
        }
    }
}

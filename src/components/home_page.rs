use dioxus::prelude::*;
use crate::components::AppState;
use crate::Route;

#[component]
pub fn HomeComponent() -> Element {
    let app_state = use_context::<AppState>();
    let email = app_state.user_email();

    rsx! {
        div { class: "page",
            h2 { class: "page-title", "Bienvenido a SmartPol" }
            p { class: "muted", "Sesión iniciada como {email}" }
            div { class: "card-grid",
                Link { to: Route::PersonasComponent {}, class: "card",
                    h3 { "Personas" }
                    p { "Registrar, editar y eliminar votantes." }
                }
                Link { to: Route::ReportesComponent {}, class: "card",
                    h3 { "Reportes" }
                    p { "Filtrar votantes, ver totales y exportar a Excel." }
                }
            }
        }
    }
}

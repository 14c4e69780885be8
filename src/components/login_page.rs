use dioxus::prelude::*;
use crate::backend::AppCmd;
use crate::components::{send, AppState, CmdSender};
use crate::Route;

#[component]
pub fn LoginComponent() -> Element {
    let cmd_tx = use_context::<CmdSender>();
    let mut app_state = use_context::<AppState>();
    let navigator = use_navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut show_password = use_signal(|| false);

    // Signed in, either restored from the store or just now.
    use_effect(move || {
        if app_state.is_authenticated() {
            navigator.replace(Route::HomeComponent {});
        }
    });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if (app_state.login_pending)() {
            return;
        }
        app_state.login_error.set(None);
        app_state.login_pending.set(true);
        send(&cmd_tx, AppCmd::Login { email: email(), password: password() });
    };

    let error = app_state.login_error.read().clone();
    let email_missing = error.is_some() && email.read().is_empty();
    let pending = (app_state.login_pending)();
    let password_type = if show_password() { "text" } else { "password" };

    rsx! {
        div { class: "login-screen",
            div { class: "login-card",
                div { class: "login-header",
                    div { class: "logo-text", "SmartPol" }
                    h2 { "INICIAR SESIÓN" }
                }

                if let Some(message) = error {
                    p { class: "login-error", "{message}" }
                }

                form { class: "login-form", onsubmit: on_submit,
                    div {
                        input {
                            class: if email_missing { "input input-invalid" } else { "input" },
                            r#type: "text",
                            placeholder: "Usuario",
                            value: "{email}",
                            oninput: move |evt| email.set(evt.value()),
                        }
                        if email_missing {
                            p { class: "field-hint", "⚠ Campo requerido" }
                        }
                    }
                    div { class: "password-field",
                        input {
                            class: "input",
                            r#type: "{password_type}",
                            placeholder: "Contraseña",
                            value: "{password}",
                            oninput: move |evt| password.set(evt.value()),
                        }
                        button {
                            r#type: "button",
                            class: "btn-link password-toggle",
                            onclick: move |_| show_password.toggle(),
                            if show_password() { "Ocultar" } else { "Mostrar" }
                        }
                    }
                    button { r#type: "submit", class: "btn btn-primary btn-block", disabled: pending,
                        if pending { "INGRESANDO..." } else { "INGRESAR" }
                    }
                }
            }
        }
    }
}

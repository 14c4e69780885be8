use dioxus::prelude::*;

/// Labelled text input. `required` adds the asterisk only; checking happens
/// in the form model.
#[component]
pub fn TextField(
    label: String,
    value: String,
    #[props(default)] required: bool,
    #[props(default = "text".to_string())] input_type: String,
    oninput: EventHandler<String>,
) -> Element {
    rsx! {
        label { class: "field",
            span { class: "field-label",
                "{label}"
                if required {
                    span { class: "field-required", " *" }
                }
            }
            input {
                class: "input",
                r#type: "{input_type}",
                value: "{value}",
                oninput: move |evt| oninput.call(evt.value()),
            }
        }
    }
}

/// Select over `(value, label)` pairs with a leading empty option.
#[component]
pub fn SelectField(
    label: String,
    value: String,
    options: Vec<(String, String)>,
    #[props(default = "Seleccione...".to_string())] placeholder: String,
    #[props(default)] required: bool,
    #[props(default)] disabled: bool,
    onchange: EventHandler<String>,
) -> Element {
    rsx! {
        label { class: "field",
            span { class: "field-label",
                "{label}"
                if required {
                    span { class: "field-required", " *" }
                }
            }
            select {
                class: "input",
                disabled,
                onchange: move |evt| onchange.call(evt.value()),
                option { value: "", selected: value.is_empty(), "{placeholder}" }
                for (key, text) in options {
                    option { key: "{key}", value: "{key}", selected: key == value, "{text}" }
                }
            }
        }
    }
}

#[component]
pub fn ErrorBanner(message: String, on_dismiss: Option<EventHandler<()>>) -> Element {
    rsx! {
        div { class: "error-banner", role: "alert",
            span { "{message}" }
            if let Some(handler) = on_dismiss {
                button { class: "btn-link", onclick: move |_| handler.call(()), "×" }
            }
        }
    }
}

#[component]
pub fn Modal(title: String, on_close: EventHandler<()>, children: Element) -> Element {
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal",
                div { class: "modal-header",
                    h2 { "{title}" }
                    button { class: "btn-link", onclick: move |_| on_close.call(()), "×" }
                }
                div { class: "modal-body", {children} }
            }
        }
    }
}

/// Yes/no dialog used before destructive actions.
#[component]
pub fn ConfirmDialog(message: String, on_confirm: EventHandler<()>, on_cancel: EventHandler<()>) -> Element {
    rsx! {
        Modal { title: "Confirmar".to_string(), on_close: on_cancel,
            p { "{message}" }
            div { class: "modal-actions",
                button { class: "btn btn-secondary", onclick: move |_| on_cancel.call(()), "Cancelar" }
                button { class: "btn btn-danger", onclick: move |_| on_confirm.call(()), "Eliminar" }
            }
        }
    }
}

#[component]
pub fn Spinner() -> Element {
    rsx! {
        div { class: "spinner", "Cargando..." }
    }
}

use dioxus::prelude::*;
use crate::backend::AppCmd;
use crate::components::common::{ConfirmDialog, ErrorBanner, Spinner};
use crate::components::voter_form::VoterFormModal;
use crate::components::{send, AppState, CmdSender};
use crate::state::form::{FormConfig, VoterForm};
use crate::state::report::gender_label;

#[component]
pub fn PersonasComponent() -> Element {
    let cmd_tx = use_context::<CmdSender>();
    let mut app_state = use_context::<AppState>();

    let cmd_tx_init = cmd_tx.clone();
    use_effect(move || {
        let page = app_state.listing.write().request(1);
        send(&cmd_tx_init, AppCmd::FetchVoters { page, enrich: true });
        send(&cmd_tx_init, AppCmd::FetchFormOptions);
    });

    let go_to = {
        let cmd_tx = cmd_tx.clone();
        move |page: Option<u32>| {
            if let Some(page) = page {
                let page = app_state.listing.write().request(page);
                send(&cmd_tx, AppCmd::FetchVoters { page, enrich: true });
            }
        }
    };
    let mut go_previous = go_to.clone();
    let mut go_next = go_to;

    let open_create = move |_| app_state.voter_form.set(Some(VoterForm::new(FormConfig::default())));

    let open_edit = {
        let cmd_tx = cmd_tx.clone();
        move |voter_id: i64| {
            let Some(row) = app_state.listing.read().row(voter_id).cloned() else { return };
            let (form, requests) = VoterForm::edit(FormConfig::default(), &row.voter);
            app_state.voter_form.set(Some(form));
            for request in requests {
                send(&cmd_tx, request.into());
            }
        }
    };

    let confirm_delete = {
        let cmd_tx = cmd_tx.clone();
        move |_| {
            let mut listing = app_state.listing.write();
            if let Some(voter_id) = listing.confirm_delete() {
                send(&cmd_tx, AppCmd::DeleteVoter { voter_id, page: listing.page });
            }
        }
    };

    let listing = app_state.listing.read();
    let visible: Vec<_> = listing.visible().into_iter().cloned().collect();
    let search = listing.search.clone();
    let (page, pages, total) = (listing.page, listing.pages.max(1), listing.total);
    let (has_previous, has_next) = (listing.has_previous(), listing.has_next());
    let previous_page = listing.previous_page();
    let next_page = listing.next_page();
    let loading = listing.loading;
    let error = listing.error.clone();
    let pending_delete = listing.pending_delete();
    drop(listing);

    let has_form = app_state.voter_form.read().is_some();

    rsx! {
        div { class: "page",
            div { class: "page-header",
                h2 { class: "page-title", "Listado de Votantes" }
                button { class: "btn btn-primary", onclick: open_create, "+ Agregar Votante" }
            }

            input {
                class: "input search",
                placeholder: "Buscar en esta página...",
                value: "{search}",
                oninput: move |evt| app_state.listing.write().search = evt.value(),
            }

            if has_form {
                VoterFormModal {}
            }

            if let Some(voter_id) = pending_delete {
                ConfirmDialog {
                    message: format!("¿Eliminar el votante #{voter_id}?"),
                    on_confirm: confirm_delete,
                    on_cancel: move |_| app_state.listing.write().cancel_delete(),
                }
            }

            if let Some(message) = error {
                ErrorBanner { message }
            }

            if loading {
                Spinner {}
            } else {
                div { class: "table-wrapper",
                    table { class: "table",
                        thead {
                            tr {
                                for header in ["ID", "Nombre", "Identificación", "Género", "Correo", "Teléfono", "Ubicación de votación", "Candidatos", "Acciones"] {
                                    th { key: "{header}", "{header}" }
                                }
                            }
                        }
                        tbody {
                            if visible.is_empty() {
                                tr {
                                    td { colspan: "9", class: "empty-row", "No hay votantes para mostrar" }
                                }
                            }
                            for row in visible {
                                {
                                    let voter = &row.voter;
                                    let voter_id = voter.id;
                                    let mut open_edit = open_edit.clone();
                                    rsx! {
                                        tr { key: "{voter_id}",
                                            td { "{voter_id}" }
                                            td { class: "strong", "{voter.full_name()}" }
                                            td { "{voter.identification}" }
                                            td { "{gender_label(voter.gender.as_deref())}" }
                                            td { {voter.email.clone().unwrap_or_default()} }
                                            td { {voter.phone.clone().unwrap_or_default()} }
                                            td {
                                                {format!(
                                                    "{} - {}",
                                                    voter.voting_location.as_deref().unwrap_or(""),
                                                    voter.voting_booth.as_deref().unwrap_or("")
                                                )}
                                            }
                                            td { "{row.assigned_label()}" }
                                            td { class: "actions",
                                                button { class: "btn-link", onclick: move |_| open_edit(voter_id), "Editar" }
                                                button {
                                                    class: "btn-link danger",
                                                    onclick: move |_| app_state.listing.write().ask_delete(voter_id),
                                                    "Eliminar"
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            div { class: "pagination",
                button {
                    class: "btn btn-secondary",
                    disabled: !has_previous,
                    onclick: move |_| go_previous(previous_page),
                    "Anterior"
                }
                span { "Página {page} de {pages} · {total} votantes" }
                button {
                    class: "btn btn-secondary",
                    disabled: !has_next,
                    onclick: move |_| go_next(next_page),
                    "Siguiente"
                }
            }
        }
    }
}

use dioxus::prelude::*;
use crate::backend::AppCmd;
use crate::components::common::{ErrorBanner, Modal, SelectField, TextField};
use crate::components::{send, AppState, CmdSender};
use crate::state::form::{AssignmentMode, Field, VoterForm, BLOOD_TYPES, GENDERS, TEXT_FIELDS};
use crate::state::parse_id;

fn input_type(field: Field) -> &'static str {
    match field {
        Field::BirthDate => "date",
        Field::Email => "email",
        Field::Phone => "tel",
        _ => "text",
    }
}

fn id_value(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

/// Create/edit dialog over the form held in `AppState::voter_form`.
#[component]
pub fn VoterFormModal() -> Element {
    let cmd_tx = use_context::<CmdSender>();
    let mut app_state = use_context::<AppState>();

    let Some(form) = app_state.voter_form.read().clone() else {
        return rsx! {};
    };

    // Runs `action` on the open form and forwards whatever lookup it asks for.
    let update = {
        let cmd_tx = cmd_tx.clone();
        move |action: &dyn Fn(&mut VoterForm) -> Option<AppCmd>| {
            let cmd = app_state.voter_form.write().as_mut().and_then(|form| action(form));
            if let Some(cmd) = cmd {
                send(&cmd_tx, cmd);
            }
        }
    };

    let on_submit = {
        let cmd_tx = cmd_tx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let refresh_page = app_state.listing.peek().page;
            let mut slot = app_state.voter_form.write();
            let Some(form) = slot.as_mut() else { return };
            if form.saving {
                return;
            }
            match form.submission() {
                Ok(submission) => {
                    form.begin_submit();
                    send(&cmd_tx, AppCmd::SaveVoter { submission, refresh_page });
                }
                Err(e) => form.error = Some(e.to_string()),
            }
        }
    };

    let title = if form.is_editing() { "Editar Votante" } else { "Agregar Votante" };
    let departments: Vec<(String, String)> =
        app_state.departments.read().iter().map(|d| (d.id.to_string(), d.name.clone())).collect();
    let leaders: Vec<(String, String)> =
        app_state.leaders.read().iter().map(|l| (l.id.to_string(), l.name.clone())).collect();
    let municipalities: Vec<(String, String)> =
        form.municipality_options().iter().map(|m| (m.id.to_string(), m.name.clone())).collect();
    let candidates = form.candidate_options().to_vec();
    let selected = form.candidate_ids().to_vec();
    let config = form.config.clone();

    let mut on_department = update.clone();
    let mut on_municipality = update.clone();
    let mut on_leader = update.clone();
    let on_candidate = update.clone();
    let mut on_gender = update.clone();
    let mut on_blood = update.clone();

    rsx! {
        Modal { title: title.to_string(), on_close: move |_| app_state.voter_form.set(None),
            form { class: "voter-form", onsubmit: on_submit,
                if let Some(message) = form.error.clone() {
                    ErrorBanner { message }
                }

                div { class: "form-grid",
                    for field in TEXT_FIELDS {
                        {
                            let mut on_text = update.clone();
                            rsx! {
                                TextField {
                                    key: "{field:?}",
                                    label: field.label().to_string(),
                                    value: form.text(field).to_string(),
                                    required: config.is_required(field),
                                    input_type: input_type(field).to_string(),
                                    oninput: move |value: String| on_text(&move |f: &mut VoterForm| {
                                        f.set_text(field, value.clone());
                                        None
                                    }),
                                }
                            }
                        }
                    }

                    SelectField {
                        label: Field::Gender.label().to_string(),
                        value: form.text(Field::Gender).to_string(),
                        options: GENDERS.iter().map(|(v, l)| (v.to_string(), l.to_string())).collect::<Vec<_>>(),
                        required: config.is_required(Field::Gender),
                        onchange: move |value: String| on_gender(&move |f: &mut VoterForm| {
                            f.set_text(Field::Gender, value.clone());
                            None
                        }),
                    }
                    SelectField {
                        label: Field::BloodType.label().to_string(),
                        value: form.text(Field::BloodType).to_string(),
                        options: BLOOD_TYPES.iter().map(|b| (b.to_string(), b.to_string())).collect::<Vec<_>>(),
                        required: config.is_required(Field::BloodType),
                        onchange: move |value: String| on_blood(&move |f: &mut VoterForm| {
                            f.set_text(Field::BloodType, value.clone());
                            None
                        }),
                    }
                    SelectField {
                        label: Field::Department.label().to_string(),
                        value: id_value(form.department_id()),
                        options: departments,
                        required: config.is_required(Field::Department),
                        onchange: move |value: String| on_department(&move |f: &mut VoterForm| {
                            f.select_department(parse_id(&value)).map(AppCmd::from)
                        }),
                    }
                    SelectField {
                        label: Field::Municipality.label().to_string(),
                        value: id_value(form.municipality_id()),
                        options: municipalities,
                        placeholder: (if form.municipalities_loading() { "Cargando..." } else { "Seleccione..." }).to_string(),
                        required: config.is_required(Field::Municipality),
                        disabled: form.department_id().is_none(),
                        onchange: move |value: String| on_municipality(&move |f: &mut VoterForm| {
                            f.select_municipality(parse_id(&value));
                            None
                        }),
                    }
                    SelectField {
                        label: Field::Leader.label().to_string(),
                        value: id_value(form.leader_id()),
                        options: leaders,
                        required: config.is_required(Field::Leader),
                        onchange: move |value: String| on_leader(&move |f: &mut VoterForm| {
                            f.select_leader(parse_id(&value)).map(AppCmd::from)
                        }),
                    }
                }

                fieldset { class: "candidate-list",
                    legend {
                        "{Field::Candidates.label()}"
                        if config.is_required(Field::Candidates) {
                            span { class: "field-required", " *" }
                        }
                    }
                    if form.leader_id().is_none() {
                        p { class: "muted", "Seleccione un líder para ver sus candidatos" }
                    } else if form.candidates_loading() {
                        p { class: "muted", "Cargando candidatos..." }
                    } else if candidates.is_empty() {
                        p { class: "muted", "El líder no tiene candidatos asignados" }
                    }
                    for candidate in candidates {
                        {
                            let mut on_candidate = on_candidate.clone();
                            let candidate_id = candidate.id;
                            let checked = selected.contains(&candidate_id);
                            let input_type = match config.assignment {
                                AssignmentMode::Single => "radio",
                                AssignmentMode::Multi => "checkbox",
                            };
                            rsx! {
                                label { key: "{candidate_id}", class: "checkbox",
                                    input {
                                        r#type: "{input_type}",
                                        name: "candidate",
                                        checked,
                                        onchange: move |_| on_candidate(&move |f: &mut VoterForm| {
                                            f.toggle_candidate(candidate_id);
                                            None
                                        }),
                                    }
                                    span { "{candidate.name}" }
                                    if let Some(corporation) = &candidate.corporation {
                                        span { class: "muted", " ({corporation.name})" }
                                    }
                                }
                            }
                        }
                    }
                }

                div { class: "modal-actions",
                    button {
                        r#type: "button",
                        class: "btn btn-secondary",
                        onclick: move |_| app_state.voter_form.set(None),
                        "Cancelar"
                    }
                    button { r#type: "submit", class: "btn btn-primary", disabled: form.saving,
                        if form.saving { "Guardando..." } else { "Guardar" }
                    }
                }
            }
        }
    }
}

use dioxus::prelude::*;
use crate::backend::api::reports::ReportFilters;
use crate::backend::export::{export_voters, ExportError, SpreadsheetExport};
use crate::backend::model::{Aggregations, Voter};
use crate::backend::AppCmd;
use crate::components::common::{ErrorBanner, SelectField, Spinner};
use crate::components::{send, AppState, CmdSender};
use crate::state::form::GENDERS;
use crate::state::report::{gender_label, BucketKey, FilterKey, ReportView, SortColumn, SortDirection};

/// Hands the workbook to the user as a file in the working directory.
#[cfg(not(target_arch = "wasm32"))]
fn deliver(export: SpreadsheetExport) -> Result<String, ExportError> {
    let dir = std::env::current_dir()?;
    let path = export.write_to(&dir)?;
    Ok(format!("Archivo guardado en {}", path.display()))
}

/// Hands the workbook to the browser as a download.
#[cfg(target_arch = "wasm32")]
fn deliver(export: SpreadsheetExport) -> Result<String, ExportError> {
    use base64::{engine::general_purpose, Engine as _};
    let data = general_purpose::STANDARD.encode(&export.bytes);
    let script = format!(
        "try {{\
           const a = document.createElement('a');\
           a.href = 'data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,{data}';\
           a.download = '{name}';\
           document.body.appendChild(a); a.click(); a.remove();\
           dioxus.send(null);\
         }} catch (e) {{ dioxus.send(String(e)); }}",
        data = data,
        name = export.file_name,
    );
    let mut eval = document::eval(&script);
    spawn(async move {
        match eval.recv::<serde_json::Value>().await {
            Ok(serde_json::Value::Null) => {}
            Ok(error) => tracing::warn!(%error, "Download script failed"),
            Err(e) => tracing::warn!("Download script failed: {:?}", e),
        }
    });
    Ok(format!("Descargando {}", export.file_name))
}

fn sort_marker(view: &ReportView, column: SortColumn) -> &'static str {
    match view.sort {
        (current, SortDirection::Asc) if current == column => " ▲",
        (current, SortDirection::Desc) if current == column => " ▼",
        _ => " ⇅",
    }
}

fn names_or_na(names: Vec<String>) -> String {
    if names.is_empty() {
        "N/A".to_string()
    } else {
        names.join(", ")
    }
}

#[component]
pub fn ReportesComponent() -> Element {
    let cmd_tx = use_context::<CmdSender>();
    let mut app_state = use_context::<AppState>();

    let fetch = {
        let cmd_tx = cmd_tx.clone();
        move |filters: ReportFilters| {
            tracing::debug!(?filters, "Fetching report");
            send(&cmd_tx, AppCmd::FetchReport { filters });
        }
    };

    let fetch_init = fetch.clone();
    let cmd_tx_init = cmd_tx.clone();
    use_effect(move || {
        send(&cmd_tx_init, AppCmd::FetchReportOptions);
        let filters = app_state.report.write().request();
        fetch_init(filters);
    });

    // Applies a filter-panel change, then refetches.
    let set_filter = {
        let fetch = fetch.clone();
        move |key: FilterKey, value: String| {
            let candidates = app_state.candidates.peek().clone();
            let filters = {
                let mut report = app_state.report.write();
                report.set_filter(key, value, &candidates);
                report.request()
            };
            fetch(filters);
        }
    };

    let toggle = {
        let fetch = fetch.clone();
        move |bucket: BucketKey| {
            let filters = {
                let mut report = app_state.report.write();
                report.toggle_bucket(bucket);
                report.request()
            };
            fetch(filters);
        }
    };

    let clear = {
        let fetch = fetch.clone();
        move |_| {
            let filters = {
                let mut report = app_state.report.write();
                report.clear_filters();
                report.request()
            };
            fetch(filters);
        }
    };

    let on_export = move |_| {
        let rows: Vec<Voter> = app_state.report.read().sorted_rows().into_iter().cloned().collect();
        let today = chrono::Local::now().date_naive();
        let outcome = export_voters(&rows, today).and_then(deliver);
        match outcome {
            Ok(message) => {
                tracing::info!("{}", message);
                app_state.notice.set(Some(message));
            }
            Err(e) => {
                tracing::warn!("Export failed: {}", e);
                app_state.notice.set(Some(e.to_string()));
            }
        }
    };

    let view = app_state.report.read().clone();
    let filters = view.filters.clone();
    let leaders: Vec<(String, String)> =
        app_state.leaders.read().iter().map(|l| (l.id.to_string(), l.name.clone())).collect();
    let corporations: Vec<(String, String)> =
        app_state.corporations.read().iter().map(|c| (c.id.to_string(), c.name.clone())).collect();
    let candidates: Vec<(String, String)> = view
        .candidate_options(&app_state.candidates.read())
        .into_iter()
        .map(|c| (c.id.to_string(), c.name.clone()))
        .collect();
    let departments: Vec<(String, String)> =
        app_state.departments.read().iter().map(|d| (d.id.to_string(), d.name.clone())).collect();
    let municipalities: Vec<(String, String)> =
        view.municipality_options().into_iter().map(|(id, name)| (id.to_string(), name)).collect();
    let genders: Vec<(String, String)> = GENDERS.iter().map(|(v, l)| (v.to_string(), l.to_string())).collect();

    let rows: Vec<Voter> = view.sorted_rows().into_iter().cloned().collect();
    let id_header = format!("ID{}", sort_marker(&view, SortColumn::Id));
    let first_name_header = format!("Nombre{}", sort_marker(&view, SortColumn::FirstName));
    let last_name_header = format!("Apellido{}", sort_marker(&view, SortColumn::LastName));
    let row_count = rows.len();

    let mut on_gender = set_filter.clone();
    let mut on_leader = set_filter.clone();
    let mut on_corporation = set_filter.clone();
    let mut on_candidate = set_filter.clone();
    let mut on_department = set_filter.clone();
    let mut on_municipality = set_filter.clone();
    let mut on_location = set_filter;

    rsx! {
        div { class: "page",
            h2 { class: "page-title", "Reportes" }

            section { class: "panel",
                h2 { class: "panel-title", "Filtros de Búsqueda" }
                div { class: "filter-grid",
                    SelectField {
                        label: "Género".to_string(),
                        value: filters.gender.clone(),
                        options: genders,
                        placeholder: "Todos".to_string(),
                        onchange: move |v: String| on_gender(FilterKey::Gender, v),
                    }
                    SelectField {
                        label: "Líder".to_string(),
                        value: filters.leader_id.clone(),
                        options: leaders,
                        placeholder: "Todos".to_string(),
                        onchange: move |v: String| on_leader(FilterKey::Leader, v),
                    }
                    SelectField {
                        label: "Corporación".to_string(),
                        value: filters.corporation_id.clone(),
                        options: corporations,
                        placeholder: "Todas".to_string(),
                        onchange: move |v: String| on_corporation(FilterKey::Corporation, v),
                    }
                    SelectField {
                        label: "Candidato".to_string(),
                        value: filters.candidate_id.clone(),
                        options: candidates,
                        placeholder: "Todos".to_string(),
                        onchange: move |v: String| on_candidate(FilterKey::Candidate, v),
                    }
                    SelectField {
                        label: "Departamento".to_string(),
                        value: filters.department_id.clone(),
                        options: departments,
                        placeholder: "Todos".to_string(),
                        onchange: move |v: String| on_department(FilterKey::Department, v),
                    }
                    SelectField {
                        label: "Municipio".to_string(),
                        value: filters.municipality_id.clone(),
                        options: municipalities,
                        placeholder: "Todos".to_string(),
                        disabled: filters.department_id.is_empty(),
                        onchange: move |v: String| on_municipality(FilterKey::Municipality, v),
                    }
                    label { class: "field",
                        span { class: "field-label", "Lugar de votación" }
                        input {
                            class: "input",
                            placeholder: "Buscar lugar de votación",
                            value: "{filters.voting_location}",
                            oninput: move |evt| on_location(FilterKey::VotingLocation, evt.value()),
                        }
                    }
                }
                button { class: "btn btn-secondary", onclick: clear, "Limpiar Filtros" }
            }

            if let Some(message) = view.error.clone() {
                ErrorBanner { message }
            }

            if let Some(aggregations) = view.aggregations.clone() {
                Counters { aggregations, view: view.clone(), on_toggle: toggle }
            }

            section { class: "panel",
                div { class: "panel-header",
                    h2 { class: "panel-title", "Votantes Registrados ({row_count})" }
                    button { class: "btn btn-success", onclick: on_export, "Exportar a Excel" }
                }
                if view.loading {
                    Spinner {}
                } else {
                    div { class: "table-wrapper",
                        table { class: "table",
                            thead {
                                tr {
                                    th { class: "sortable", onclick: move |_| app_state.report.write().sort_by(SortColumn::Id), "{id_header}" }
                                    th { class: "sortable", onclick: move |_| app_state.report.write().sort_by(SortColumn::FirstName), "{first_name_header}" }
                                    th { class: "sortable", onclick: move |_| app_state.report.write().sort_by(SortColumn::LastName), "{last_name_header}" }
                                    th { "Identificación" }
                                    th { "Género" }
                                    th { "Teléfono" }
                                    th { "Departamento" }
                                    th { "Municipio" }
                                    th { "Lugar de Votación" }
                                    th { "Candidatos" }
                                    th { "Líderes" }
                                }
                            }
                            tbody {
                                if rows.is_empty() {
                                    tr {
                                        td { colspan: "11", class: "empty-row", "No hay votantes registrados con los filtros aplicados" }
                                    }
                                }
                                for voter in rows {
                                    tr { key: "{voter.id}",
                                        td { "{voter.id}" }
                                        td { "{voter.first_name}" }
                                        td { "{voter.last_name}" }
                                        td { class: "mono", "{voter.identification}" }
                                        td { {gender_label(voter.gender.as_deref())} }
                                        td { {voter.phone.clone().unwrap_or_default()} }
                                        td { {voter.department.as_ref().map(|d| d.name.clone()).unwrap_or_else(|| "N/A".to_string())} }
                                        td { {voter.municipality.as_ref().map(|m| m.name.clone()).unwrap_or_else(|| "N/A".to_string())} }
                                        td { {voter.voting_location.clone().unwrap_or_default()} }
                                        td { {names_or_na(voter.candidates.iter().map(|c| c.name.clone()).collect())} }
                                        td { {names_or_na(voter.leaders.iter().map(|l| l.name.clone()).collect())} }
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

/// Aggregation counters; each one toggles the filter it counts.
#[component]
fn Counters(aggregations: Aggregations, view: ReportView, on_toggle: EventHandler<BucketKey>) -> Element {
    let item_class = |bucket: &BucketKey| if view.is_active(bucket) { "counter active" } else { "counter" };

    rsx! {
        section { class: "panel",
            h2 { class: "panel-title", "Resumen de Información" }
            div { class: "counter-grid",
                div { class: "counter-group",
                    h3 { "Por Género" }
                    for item in aggregations.by_gender.iter() {
                        {
                            let gender_key = format!("{:?}", item.gender);
                            let bucket = BucketKey::Gender(item.gender.clone().unwrap_or_default());
                            let class = item_class(&bucket);
                            let label = match item.gender.as_deref() {
                                Some(g) if !g.is_empty() => gender_label(Some(g)),
                                _ => "No especificado",
                            };
                            rsx! {
                                button { key: "{gender_key}", class, onclick: move |_| on_toggle.call(bucket.clone()),
                                    span { "{label}" }
                                    span { class: "count", "{item.count}" }
                                }
                            }
                        }
                    }
                }
                div { class: "counter-group",
                    h3 { "Por Líder" }
                    for item in aggregations.by_leader.iter() {
                        {
                            let bucket = BucketKey::Leader(item.id);
                            let class = item_class(&bucket);
                            rsx! {
                                button { key: "{item.id}", class, title: "{item.name}", onclick: move |_| on_toggle.call(bucket.clone()),
                                    span { "{item.name}" }
                                    span { class: "count", "{item.count}" }
                                }
                            }
                        }
                    }
                }
                div { class: "counter-group",
                    h3 { "Por Candidato" }
                    for item in aggregations.by_candidate.iter() {
                        {
                            let bucket = BucketKey::Candidate(item.id);
                            let class = item_class(&bucket);
                            let corporation = item.corporation_name.clone().unwrap_or_default();
                            rsx! {
                                button { key: "{item.id}", class, onclick: move |_| on_toggle.call(bucket.clone()),
                                    span { "{item.name}" }
                                    span { class: "muted", "{corporation}" }
                                    span { class: "count", "{item.count}" }
                                }
                            }
                        }
                    }
                }
                div { class: "counter-group",
                    h3 { "Por Ubicación" }
                    for item in aggregations.by_location.iter() {
                        {
                            let bucket = BucketKey::Location {
                                department_id: item.department_id,
                                municipality_id: item.municipality_id,
                            };
                            let class = item_class(&bucket);
                            rsx! {
                                button {
                                    key: "{item.department_id}-{item.municipality_id}",
                                    class,
                                    onclick: move |_| on_toggle.call(bucket.clone()),
                                    span { "{item.department_name}" }
                                    span { class: "muted", "{item.municipality_name}" }
                                    span { class: "count", "{item.count}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

mod backend;
mod components;
mod config;
mod state;

use components::home_page::HomeComponent;
use components::login_page::LoginComponent;
use components::nav_bar::NavComponent;
use components::personas_page::PersonasComponent;
use components::reportes_page::ReportesComponent;
use components::AppState;

use backend::{AppCmd, AppEvent};
use config::Config;
use dioxus::prelude::*;
use tokio::sync::mpsc;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    LoginComponent {},
    #[layout(NavComponent)]
    #[route("/inicio")]
    HomeComponent {},
    #[route("/personas")]
    PersonasComponent {},
    #[route("/reportes")]
    ReportesComponent {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::{fmt, EnvFilter};
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smartpol=info"));
        // dioxus may already have installed its own subscriber
        let _ = fmt().with_env_filter(filter).try_init();
    }
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let config = use_hook(Config::load);
    let mut app_state = AppState::new(&config);
    use_context_provider(|| app_state);

    let cmd_tx = use_hook(|| {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCmd>();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

        spawn(backend::init(config.clone(), cmd_rx, event_tx));

        let follow_up = cmd_tx.clone();
        spawn(async move {
            while let Some(event) = event_rx.recv().await {
                app_state.apply(event, &follow_up);
            }
        });
        cmd_tx
    });
    use_context_provider(|| cmd_tx);

    rsx! {
        document::Stylesheet { href: asset!("/assets/main.css") }
        Router::<Route> {}
    }
}

/// Unknown paths fall back to the login view, which forwards signed-in users
/// to the dashboard.
#[component]
fn NotFound(segments: Vec<String>) -> Element {
    tracing::debug!(path = %segments.join("/"), "Unknown route");
    let navigator = use_navigator();
    use_effect(move || {
        navigator.replace(Route::LoginComponent {});
    });
    rsx! {}
}

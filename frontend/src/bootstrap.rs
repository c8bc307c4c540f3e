use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{console, window, Element};
use yew::AppHandle;

use crate::api::{HttpUserSource, LoadError};
use crate::components::user_table::{UserTable, UserTableProps};
use crate::loader::{LoadOutcome, RowTarget, UserTableLoader};
use crate::user::User;
use crate::USER_TABLE_BODY_ID;

type PageLoader = UserTableLoader<HttpUserSource, DomTable>;

thread_local! {
    static LOADER: Rc<PageLoader> = Rc::new(UserTableLoader::new(
        HttpUserSource,
        DomTable::new(USER_TABLE_BODY_ID),
    ));
}

/// The `<tbody>` in the hosting page, with the Yew app mounted into it once
/// the first load succeeds.
pub struct DomTable {
    container_id: &'static str,
    app: Option<AppHandle<UserTable>>,
}

impl DomTable {
    pub fn new(container_id: &'static str) -> Self {
        Self {
            container_id,
            app: None,
        }
    }
}

impl RowTarget for DomTable {
    fn replace_rows(&mut self, users: Vec<User>) -> Result<(), LoadError> {
        let props = UserTableProps { users };

        match self.app.as_mut() {
            Some(app) => app.update(props),
            None => {
                let container = find_container(self.container_id)?;
                // Drop whatever the page shipped inside the tbody before mounting.
                container.set_text_content(None);
                let app = yew::Renderer::<UserTable>::with_root_and_props(container, props).render();
                self.app = Some(app);
            }
        }

        Ok(())
    }
}

fn find_container(id: &'static str) -> Result<Element, LoadError> {
    window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .ok_or(LoadError::MissingContainer(id))
}

fn loader() -> Rc<PageLoader> {
    LOADER.with(Rc::clone)
}

async fn load_and_report() -> Result<LoadOutcome, LoadError> {
    let outcome = loader().load().await;

    match &outcome {
        Ok(LoadOutcome::Rendered(count)) => {
            console::log_1(&format!("Rendered {} users", count).into())
        }
        Ok(LoadOutcome::Superseded) => {
            console::log_1(&"User load superseded by a newer one".into())
        }
        Err(err) => console::error_1(&format!("Failed to load users: {}", err).into()),
    }

    outcome
}

/// Registers the table load with the page's `load` event.
pub fn on_page_load() {
    when_page_loaded(spawn_load);
}

/// Runs `run` once the page has finished loading.
///
/// If the page already finished loading when this is called, `run` is
/// invoked right away.
pub fn when_page_loaded(run: impl FnOnce() + 'static) {
    let Some(window) = window() else {
        console::error_1(&"No window, user table not loaded".into());
        return;
    };

    let loaded = window
        .document()
        .is_some_and(|document| document.ready_state() == "complete");

    if loaded {
        run();
    } else {
        EventListener::once(&window, "load", move |_| run()).forget();
    }
}

fn spawn_load() {
    spawn_local(async {
        // Both outcomes were already written to the console.
        load_and_report().await.ok();
    });
}

/// Re-runs the load from JavaScript.
///
/// Resolves with the number of rendered rows, or `null` when a newer load
/// overtook this one. Rejects with the error message otherwise.
#[wasm_bindgen(js_name = reloadUsers)]
pub async fn reload_users() -> Result<JsValue, JsError> {
    match load_and_report().await {
        Ok(LoadOutcome::Rendered(count)) => Ok(JsValue::from(count)),
        Ok(LoadOutcome::Superseded) => Ok(JsValue::NULL),
        Err(err) => Err(JsError::new(&err.to_string())),
    }
}

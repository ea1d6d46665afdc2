use ammonia::Builder;

use crate::client::{ClientError, StoreClient};
use crate::models::store::Store;

pub const RESULT_CLASS: &str = "search__result";
pub const ACTIVE_CLASS: &str = "search__result--active";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Other,
}

/// Search box state: the rendered results and which one is highlighted.
#[derive(Debug, Default)]
pub struct TypeAhead {
    pub visible: bool,
    pub markup: String,
    results: Vec<Store>,
    active: Option<usize>,
}

fn sanitize(html: &str) -> String {
    Builder::default()
        .add_generic_attributes(&["class"])
        .clean(html)
        .to_string()
}

/// One link per store, the highlighted one carrying the active class too.
pub fn results_markup(stores: &[Store], active: Option<usize>) -> String {
    stores
        .iter()
        .enumerate()
        .map(|(index, store)| {
            let class = if active == Some(index) {
                format!("{} {}", RESULT_CLASS, ACTIVE_CLASS)
            } else {
                RESULT_CLASS.to_owned()
            };

            format!(
                r#"<a href="/store/{}" class="{}"><strong>{}</strong></a>"#,
                store.slug, class, store.name
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

impl TypeAhead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link of the highlighted result.
    pub fn active(&self) -> Option<String> {
        self.active
            .and_then(|index| self.results.get(index))
            .map(|store| format!("/store/{}", store.slug))
    }

    /// Handles a change of the search input.
    pub async fn input<S: AsRef<str>>(
        &mut self,
        client: &StoreClient,
        value: S,
    ) -> Result<(), ClientError> {
        let value = value.as_ref();
        if value.is_empty() {
            self.hide();
            return Ok(());
        }

        self.visible = true;
        let stores = client.search(value).await?;
        self.show(value, &stores);

        Ok(())
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn show(&mut self, value: &str, stores: &[Store]) {
        self.visible = true;
        self.active = None;
        self.results = stores.to_vec();

        self.markup = if stores.is_empty() {
            sanitize(&format!(
                r#"<div class="{}">No results for {} found</div>"#,
                RESULT_CLASS, value
            ))
        } else {
            sanitize(&results_markup(&self.results, None))
        };
    }

    /// Moves the highlight, wrapping at both ends. Enter answers the link to follow.
    pub fn key(&mut self, key: Key) -> Option<String> {
        let count = self.results.len();
        if count == 0 {
            return None;
        }

        let next = match (key, self.active) {
            (Key::Down, Some(current)) => (current + 1) % count,
            (Key::Down, None) => 0,
            (Key::Up, Some(current)) => (current + count - 1) % count,
            (Key::Up, None) => count - 1,
            (Key::Enter, _) => return self.active(),
            (Key::Other, _) => return None,
        };
        self.active = Some(next);
        self.markup = sanitize(&results_markup(&self.results, self.active));

        None
    }
}

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod review;
pub mod store;
pub mod user;

#[cfg(test)]
mod tests;

pub trait Model: Send + Sync + Unpin + Serialize + DeserializeOwned {
    fn name() -> &'static str;

    fn debug(&self) -> String;
}

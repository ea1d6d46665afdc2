use bson::oid::ObjectId;

use crate::models::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub hearts: Vec<ObjectId>,
}

/// Which way a heart toggle moves a store id in or out of `hearts`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeartOperation {
    Add,
    Remove,
}

impl User {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            name: None,
            email: None,
            hearts: Vec::new(),
        }
    }

    pub fn has_hearted(&self, store: &ObjectId) -> bool {
        self.hearts.contains(store)
    }

    pub fn heart_operation(&self, store: &ObjectId) -> HeartOperation {
        if self.has_hearted(store) {
            HeartOperation::Remove
        } else {
            HeartOperation::Add
        }
    }
}

impl Model for User {
    fn name() -> &'static str {
        "users"
    }

    fn debug(&self) -> String {
        format!("{:#?}", self)
    }
}

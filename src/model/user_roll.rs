use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type UserRolls = HashMap<String, Vec<String>>;

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct UserRollHistory {
    pub user_id: String,
    pub items: Vec<String>,
}

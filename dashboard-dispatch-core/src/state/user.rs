//! Current user slice

use crate::message::MessageSummary;
use crate::model::User;
use crate::Message;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserState {
    pub user: Option<User>,
}

impl UserState {
    pub fn initial() -> Self {
        Self::default()
    }
}

#[derive(Message, Clone, Debug)]
#[message(category = "user")]
pub enum UserAction {
    SetUser(Option<User>),
}

impl MessageSummary for UserAction {}

pub fn reduce(state: &mut UserState, action: UserAction) -> bool {
    match action {
        UserAction::SetUser(user) => {
            if state.user == user {
                return false;
            }
            state.user = user;
            true
        }
    }
}

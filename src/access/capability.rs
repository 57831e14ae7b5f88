//! Permission names and the marker types that bind them to routes.

pub const SEND_MESSAGE: &str = "send_message";
pub const VIEW_MESSAGES: &str = "view_messages";
pub const EDIT_CHAT: &str = "edit_chat";
pub const DELETE_CHAT: &str = "delete_chat";
pub const CHANGE_ROLE: &str = "change_role";
pub const BAN_USER: &str = "ban_user";

/// A permission a route requires from its caller.
pub trait Capability: Send + Sync + 'static {
    const NAME: &'static str;
}

macro_rules! capability {
    ($(#[$meta:meta])* $marker:ident => $name:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Capability for $marker {
            const NAME: &'static str = $name;
        }
    };
}

capability!(SendMessage => SEND_MESSAGE);
capability!(ViewMessages => VIEW_MESSAGES);
capability!(EditChat => EDIT_CHAT);
capability!(DeleteChat => DELETE_CHAT);
capability!(ChangeRole => CHANGE_ROLE);
capability!(BanUser => BAN_USER);

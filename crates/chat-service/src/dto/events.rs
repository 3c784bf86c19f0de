//! Wire event names shared by the gateway, the services and the bot SDK

// User stream
pub const JOIN_CONVERSATION: &str = "joinConversation";
pub const JOINED_CONVERSATION: &str = "joinedConversation";
pub const LEAVE_CONVERSATION: &str = "leaveConversation";
pub const SEND_MESSAGE: &str = "sendMessage";
pub const EDIT_MESSAGE: &str = "editMessage";
pub const DELETE_MESSAGE: &str = "deleteMessage";
pub const BUTTON_INTERACTION: &str = "buttonInteraction";

// Room broadcasts
pub const NEW_MESSAGE: &str = "newMessage";
pub const MESSAGE_EDITED: &str = "messageEdited";
pub const MESSAGE_DELETED: &str = "messageDeleted";

// Bot stream
pub const VALIDATE_COMMAND: &str = "validateCommand";
pub const COMMAND_VALIDATED: &str = "commandValidated";
pub const UPDATE_MESSAGE: &str = "updateMessage";
pub const REMOVE_MESSAGE: &str = "removeMessage";
pub const MESSAGE_SENT: &str = "messageSent";
pub const MESSAGE_UPDATE: &str = "messageUpdate";
pub const MESSAGE_REMOVED: &str = "messageRemoved";

// Interaction stream
pub const INTERACTION_CREATE: &str = "interactionCreate";
pub const BUTTON_CLICKED: &str = "buttonClicked";

pub const ERROR: &str = "error";

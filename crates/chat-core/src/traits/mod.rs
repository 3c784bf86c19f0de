mod repositories;

pub use repositories::{
    BotRepository, CommandRepository, ConversationRepository, MemberRepository,
    MessageRepository, OverwriteRepository, RepoResult, UserRepository,
};

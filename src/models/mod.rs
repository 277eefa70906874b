mod habit;
mod profession;
mod progression;
mod quest;
mod state;
mod user;

pub use habit::{HabitLog, HabitLogRequest, HabitSnapshot};
pub use profession::{
    NewProfession, Objective, ObjectiveKind, Profession, ProfessionUpdate, ProgressionTier,
    QuestType, RecommendedQuest, TIER_MAX,
};
pub use progression::{
    FullProgressionStatus, ProgressionStatus, UserProgression, XP_PER_TIER, XpAward, tier_for_xp,
};
pub use quest::{
    CompleteQuestRequest, CompletionResult, NewQuest, Quest, QuestSource, QuestStatus, UserQuest,
    UserProfessionQuest, profession_quest_id,
};
pub use state::AppState;
pub use user::{
    ChangeProfessionRequest, CreateUserRequest, PremiumRequest, User, XP_PER_LEVEL, level_for_xp,
};

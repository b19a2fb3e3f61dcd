use crate::model::configuration::Configuration;
use crate::shared::discord::MemberDirectory;
use crate::shared::file_ledger::FileLedger;
use crate::shared::name_ledger::NicknameLedger;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub configuration: Arc<Configuration>,
    pub members: Arc<dyn MemberDirectory>,
    pub file_ledger: FileLedger,
}

impl AppState {
    pub fn nickname_ledger(&self) -> NicknameLedger<'_> {
        NicknameLedger::new(
            self.members.as_ref(),
            self.configuration.guild_id,
            self.configuration.ledger.initial_points,
            self.configuration.ledger.nickname_max_length,
        )
    }
}

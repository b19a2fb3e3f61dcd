use crate::model::discord::{GuildMember, NicknameEditRequest};
use crate::shared::HTTP_CLIENT;
use axum::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use std::fmt::{Display, Formatter};

pub const BASE_URL: &str = "https://discord.com/api/v10";
pub const GUILD_MEMBER_ENDPOINT: &str = "/guilds/{guild_id}/members/{user_id}";
pub const LIST_GUILD_MEMBERS_ENDPOINT: &str = "/guilds/{guild_id}/members";
pub const MEMBER_PAGE_SIZE: u16 = 1000;

#[derive(Debug)]
pub enum ProfileError {
    Forbidden,
    Http { status: u16, message: String },
    Transport(reqwest::Error),
}

impl Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Forbidden => write!(f, "403 Forbidden (Missing Permissions)"),
            ProfileError::Http { status, message } => write!(f, "{} {}", status, message),
            ProfileError::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProfileError {
    fn from(e: reqwest::Error) -> Self {
        ProfileError::Transport(e)
    }
}

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn get_member(&self, guild_id: u64, user_id: u64) -> Result<GuildMember, ProfileError>;

    async fn edit_nickname(
        &self,
        guild_id: u64,
        user_id: u64,
        nickname: &str,
    ) -> Result<(), ProfileError>;

    /// One page of members whose id is greater than `after`, ordered by id.
    async fn list_members(
        &self,
        guild_id: u64,
        after: u64,
        limit: u16,
    ) -> Result<Vec<GuildMember>, ProfileError>;
}

pub struct DiscordClient {
    base_url: String,
    token: String,
}

impl DiscordClient {
    pub fn new<S: Into<String>, T: Into<String>>(base_url: S, token: T) -> Self {
        DiscordClient {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn member_url(&self, guild_id: u64, user_id: u64) -> String {
        self.base_url.clone()
            + &GUILD_MEMBER_ENDPOINT
                .replace("{guild_id}", &guild_id.to_string())
                .replace("{user_id}", &user_id.to_string())
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }
}

async fn check_status(response: Response) -> Result<Response, ProfileError> {
    let status = response.status();
    if status == StatusCode::FORBIDDEN {
        Err(ProfileError::Forbidden)
    } else if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        Err(ProfileError::Http {
            status: status.as_u16(),
            message,
        })
    } else {
        Ok(response)
    }
}

#[async_trait]
impl MemberDirectory for DiscordClient {
    async fn get_member(&self, guild_id: u64, user_id: u64) -> Result<GuildMember, ProfileError> {
        let response = HTTP_CLIENT
            .get(self.member_url(guild_id, user_id))
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await?;
        let member = check_status(response).await?.json::<GuildMember>().await?;
        Ok(member)
    }

    async fn edit_nickname(
        &self,
        guild_id: u64,
        user_id: u64,
        nickname: &str,
    ) -> Result<(), ProfileError> {
        let payload = NicknameEditRequest {
            nick: nickname.to_string(),
        };
        let response = HTTP_CLIENT
            .patch(self.member_url(guild_id, user_id))
            .header(AUTHORIZATION, self.authorization())
            .json(&payload)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn list_members(
        &self,
        guild_id: u64,
        after: u64,
        limit: u16,
    ) -> Result<Vec<GuildMember>, ProfileError> {
        let url = self.base_url.clone()
            + &LIST_GUILD_MEMBERS_ENDPOINT.replace("{guild_id}", &guild_id.to_string());
        let response = HTTP_CLIENT
            .get(url)
            .header(AUTHORIZATION, self.authorization())
            .query(&[("limit", limit.to_string()), ("after", after.to_string())])
            .send()
            .await?;
        let members = check_status(response)
            .await?
            .json::<Vec<GuildMember>>()
            .await?;
        Ok(members)
    }
}

use crate::model::discord::GuildMember;
use crate::shared::discord::{MemberDirectory, ProfileError, MEMBER_PAGE_SIZE};
use futures::Stream;
use once_cell::sync::Lazy;
use regex::Regex;

static POINT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[([0-9]+)pt\]\s*$").expect("Invalid point suffix pattern."));

/// Splits `"Akito [500pt]"` into `(Some(500), "Akito")`.
/// Digit runs too long for an `i64` saturate at `i64::MAX`.
pub fn extract(name: &str) -> (Option<i64>, &str) {
    match POINT_SUFFIX.captures(name) {
        Some(captures) => {
            let (Some(whole), Some(digits)) = (captures.get(0), captures.get(1)) else {
                return (None, name);
            };
            let points = digits.as_str().parse::<i64>().unwrap_or(i64::MAX);
            (Some(points), &name[..whole.start()])
        }
        None => (None, name),
    }
}

pub fn format(base: &str, points: i64, max_length: usize) -> String {
    let suffix = format!(" [{}pt]", points.max(0));
    let suffix_length = suffix.chars().count();
    if suffix_length >= max_length {
        return suffix.trim().chars().take(max_length).collect();
    }

    let room = max_length - suffix_length;
    let mut name = base.chars().take(room).collect::<String>();
    name.push_str(&suffix);
    name
}

pub struct NicknameLedger<'a> {
    members: &'a dyn MemberDirectory,
    guild_id: u64,
    initial_points: i64,
    max_length: usize,
}

impl<'a> NicknameLedger<'a> {
    pub fn new(
        members: &'a dyn MemberDirectory,
        guild_id: u64,
        initial_points: i64,
        max_length: usize,
    ) -> Self {
        NicknameLedger {
            members,
            guild_id,
            initial_points,
            max_length,
        }
    }

    pub async fn member(&self, user_id: u64) -> Result<GuildMember, ProfileError> {
        self.members.get_member(self.guild_id, user_id).await
    }

    pub fn get(&self, member: &GuildMember) -> i64 {
        extract(member.display_name())
            .0
            .unwrap_or(self.initial_points)
    }

    pub fn has_points(member: &GuildMember) -> bool {
        extract(member.display_name()).0.is_some()
    }

    pub async fn set(&self, member: &GuildMember, points: i64) -> Result<String, ProfileError> {
        let (_, base) = extract(member.display_name());
        let nickname = format(base, points, self.max_length);
        let user_id = member.user.id.parse::<u64>().map_err(|e| ProfileError::Http {
            status: 400,
            message: format!("Invalid member id {}: {}", &member.user.id, e),
        })?;
        self.members
            .edit_nickname(self.guild_id, user_id, &nickname)
            .await?;
        tracing::info!("Nickname of {} set to {}", user_id, &nickname);
        Ok(nickname)
    }

    pub fn initial_points(&self) -> i64 {
        self.initial_points
    }

    pub fn member_pages(&self) -> impl Stream<Item = Result<Vec<GuildMember>, ProfileError>> + 'a {
        let members = self.members;
        let guild_id = self.guild_id;
        futures::stream::try_unfold(Some(0u64), move |after| async move {
            let Some(after) = after else {
                return Ok(None);
            };
            let page = members
                .list_members(guild_id, after, MEMBER_PAGE_SIZE)
                .await?;
            let next = if page.len() < MEMBER_PAGE_SIZE as usize {
                None
            } else {
                page.last().and_then(|member| member.user.id.parse::<u64>().ok())
            };
            Ok(Some((page, next)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::discord::testing::InMemoryDirectory;
    use futures::TryStreamExt;
    use proptest::prelude::*;

    #[test]
    fn extracts_points_from_suffix() {
        assert_eq!(extract("Akito [500pt]"), (Some(500), "Akito"));
        assert_eq!(extract("Akito   [12pt]  "), (Some(12), "Akito"));
        assert_eq!(extract("[7pt]"), (Some(7), ""));
    }

    #[test]
    fn names_without_suffix_are_returned_whole() {
        assert_eq!(extract("Akito"), (None, "Akito"));
        assert_eq!(extract("Akito [abcpt]"), (None, "Akito [abcpt]"));
        assert_eq!(extract("Akito [500pt] again"), (None, "Akito [500pt] again"));
        assert_eq!(extract("Akito [-5pt]"), (None, "Akito [-5pt]"));
    }

    #[test]
    fn oversized_digit_runs_saturate() {
        assert_eq!(
            extract("A [99999999999999999999999pt]"),
            (Some(i64::MAX), "A")
        );
    }

    #[test]
    fn formats_akito() {
        let name = format("Akito", 500, 32);
        assert_eq!(name, "Akito [500pt]");
        assert_eq!(extract(&name), (Some(500), "Akito"));
    }

    #[test]
    fn negative_points_are_clamped() {
        assert_eq!(format("Akito", -30, 32), "Akito [0pt]");
    }

    #[test]
    fn long_bases_are_cut_to_fit() {
        let base = "a".repeat(40);
        let name = format(&base, 1200, 32);
        assert_eq!(name.chars().count(), 32);
        assert!(name.ends_with(" [1200pt]"));
        assert_eq!(extract(&name).0, Some(1200));
    }

    #[test]
    fn multibyte_bases_are_cut_by_characters() {
        let base = "あ".repeat(30);
        let name = format(&base, 500, 32);
        assert_eq!(name.chars().count(), 32);
        assert_eq!(name, "あ".repeat(24) + " [500pt]");
    }

    #[test]
    fn suffix_alone_over_the_limit_is_truncated() {
        assert_eq!(format("Akito", 123456, 8), "[123456p");
        assert_eq!(format("Akito", 5, 6), "[5pt]");
    }

    proptest! {
        #[test]
        fn format_then_extract_round_trips(base in "[A-Za-z0-9_ぁ-ん]{0,20}", points in 0i64..10_000_000) {
            let name = format(&base, points, 32);
            prop_assert_eq!(extract(&name), (Some(points), base.as_str()));
        }

        #[test]
        fn format_never_exceeds_the_limit(base in "\\PC{0,64}", points in any::<i64>(), limit in 1usize..64) {
            prop_assert!(format(&base, points, limit).chars().count() <= limit);
        }
    }

    #[tokio::test]
    async fn get_falls_back_to_initial_points_without_writing() {
        let directory = InMemoryDirectory::default().with_member(1, "akito", None);
        let ledger = NicknameLedger::new(&directory, 10, 500, 32);
        let member = ledger.member(1).await.unwrap();
        assert_eq!(ledger.get(&member), 500);
        assert_eq!(directory.nick_of(1), None);
    }

    #[tokio::test]
    async fn get_prefers_the_nickname_over_the_account_name() {
        let directory =
            InMemoryDirectory::default().with_member(1, "akito [10pt]", Some("Aki [70pt]"));
        let ledger = NicknameLedger::new(&directory, 10, 500, 32);
        let member = ledger.member(1).await.unwrap();
        assert_eq!(ledger.get(&member), 70);
    }

    #[tokio::test]
    async fn set_replaces_the_existing_suffix() {
        let directory = InMemoryDirectory::default().with_member(1, "akito", Some("Aki [70pt]"));
        let ledger = NicknameLedger::new(&directory, 10, 500, 32);
        let member = ledger.member(1).await.unwrap();
        let nickname = ledger.set(&member, 170).await.unwrap();
        assert_eq!(nickname, "Aki [170pt]");
        assert_eq!(directory.nick_of(1).as_deref(), Some("Aki [170pt]"));
    }

    #[tokio::test]
    async fn set_propagates_permission_failures() {
        let directory = InMemoryDirectory::default()
            .with_member(1, "akito", None)
            .forbid(1);
        let ledger = NicknameLedger::new(&directory, 10, 500, 32);
        let member = ledger.member(1).await.unwrap();
        let result = ledger.set(&member, 100).await;
        assert!(matches!(result, Err(ProfileError::Forbidden)));
        assert_eq!(directory.nick_of(1), None);
    }

    #[tokio::test]
    async fn member_pages_walk_the_whole_guild() {
        let directory = InMemoryDirectory::default()
            .with_member(1, "a", None)
            .with_member(2, "b", None)
            .with_bot(3, "bot");
        let ledger = NicknameLedger::new(&directory, 10, 500, 32);
        let pages = ledger.member_pages().try_collect::<Vec<_>>().await.unwrap();
        let count = pages.iter().map(Vec::len).sum::<usize>();
        assert_eq!(count, 3);
        assert_eq!(directory.cursors(), vec![0]);
    }

    #[tokio::test]
    async fn a_full_last_page_ends_on_an_empty_page() {
        let size = MEMBER_PAGE_SIZE as u64;
        let directory = InMemoryDirectory::default().with_members(1..=size);
        let ledger = NicknameLedger::new(&directory, 10, 500, 32);
        let pages = ledger.member_pages().try_collect::<Vec<_>>().await.unwrap();

        let lengths = pages.iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(lengths, vec![MEMBER_PAGE_SIZE as usize, 0]);
        assert_eq!(directory.cursors(), vec![0, size]);
    }

    #[tokio::test]
    async fn member_pages_continue_after_the_last_member_seen() {
        let size = MEMBER_PAGE_SIZE as u64;
        let directory = InMemoryDirectory::default().with_members(1..=size + 1);
        let ledger = NicknameLedger::new(&directory, 10, 500, 32);
        let pages = ledger.member_pages().try_collect::<Vec<_>>().await.unwrap();

        let lengths = pages.iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(lengths, vec![MEMBER_PAGE_SIZE as usize, 1]);
        assert_eq!(pages[1][0].user.id, (size + 1).to_string());
        assert_eq!(directory.cursors(), vec![0, size]);
    }
}

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::ErrorKind;
use std::path::Path;

pub async fn load_reward_pool(
    directory: &Path,
    extensions: &[String],
) -> anyhow::Result<Vec<String>> {
    let mut read_dir = match tokio::fs::read_dir(directory).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Reward directory {} does not exist.", directory.display());
            return Ok(vec![]);
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read reward directory {}", directory.display()))
        }
    };

    let mut rewards = vec![];
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();
        // Follows symlinks, so linked rewards count and dangling links are skipped.
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Skipping reward {}: {}", path.display(), e);
                continue;
            }
        }
        let matches_extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| {
                extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(extension))
            })
            .unwrap_or_default();
        if matches_extension {
            rewards.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    rewards.sort_unstable();
    Ok(rewards)
}

pub fn choose_reward<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> Option<String> {
    pool.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::path::PathBuf;

    async fn reward_directory(files: &[&str]) -> PathBuf {
        let directory =
            std::env::temp_dir().join(format!("pointbot-rewards-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(directory.join("nested.png"))
            .await
            .unwrap();
        for file in files {
            tokio::fs::write(directory.join(file), b"image").await.unwrap();
        }
        directory
    }

    fn image_extensions() -> Vec<String> {
        vec!["png".to_string(), "jpg".to_string()]
    }

    #[tokio::test]
    async fn pool_keeps_matching_files_only() {
        let directory = reward_directory(&["b.png", "a.JPG", "notes.txt", "noext"]).await;
        let pool = load_reward_pool(&directory, &image_extensions())
            .await
            .unwrap();
        assert_eq!(pool, vec!["a.JPG".to_string(), "b.png".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_rewards_are_part_of_the_pool() {
        let directory = reward_directory(&["a.png"]).await;
        let shared = reward_directory(&["shared.png"]).await;
        tokio::fs::symlink(shared.join("shared.png"), directory.join("linked.png"))
            .await
            .unwrap();
        tokio::fs::symlink(directory.join("gone.png"), directory.join("dangling.png"))
            .await
            .unwrap();

        let pool = load_reward_pool(&directory, &image_extensions())
            .await
            .unwrap();
        assert_eq!(pool, vec!["a.png".to_string(), "linked.png".to_string()]);
    }

    #[tokio::test]
    async fn missing_directory_is_an_empty_pool() {
        let directory =
            std::env::temp_dir().join(format!("pointbot-none-{}", uuid::Uuid::new_v4()));
        let pool = load_reward_pool(&directory, &image_extensions())
            .await
            .unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn choose_reward_draws_from_the_whole_pool() {
        let pool = vec!["a.png".to_string(), "b.png".to_string(), "c.png".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = (0..200)
            .filter_map(|_| choose_reward(&pool, &mut rng))
            .collect::<HashSet<_>>();
        assert_eq!(drawn.len(), 3);
        assert_eq!(choose_reward(&[], &mut rng), None);
    }
}

//! Aggregate statistics over a fetched collection
//!
//! Pure read-only aggregation; no I/O beyond what the caller does to load
//! the collection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::Post;

pub mod domain;

pub use domain::source_label;

/// Platforms counted as social media sources.
const SOCIAL_MEDIA_DOMAINS: &[&str] = &["twitter", "facebook", "youtube"];

/// Label used for posts whose link yields no domain.
const UNKNOWN_SOURCE: &str = "(unknown)";

/// Label used for posts without a platform post type.
const UNTYPED: &str = "(none)";

/// Statistical breakdown of a post collection.
#[derive(Debug, Clone, Default)]
pub struct Breakdown {
    /// Topic profile of the first post, if any
    pub profile: Option<i64>,
    /// Source domains that are social media platforms
    pub social_sources: Vec<String>,
    /// All other source domains
    pub other_sources: Vec<String>,
    /// Post count per source domain, descending
    pub posts_per_source: Vec<(String, usize)>,
    /// Post count per post type, descending
    pub posts_per_type: Vec<(String, usize)>,
    /// Total posts in the collection
    pub total_posts: usize,
    /// Posts with a non-empty body
    pub posts_with_content: usize,
    /// Posts without a parent
    pub root_posts: usize,
    /// Untyped posts that have a parent
    pub comments: usize,
    /// Posts whose author has a display name
    pub posts_with_author_name: usize,
    /// Posts whose author has an avatar link
    pub posts_with_avatar: usize,
    /// Untyped posts with at least one non-zero engagement metric
    pub engaged_posts: usize,
    /// Engaged-post count per source domain, descending
    pub engagement_per_source: Vec<(String, usize)>,
}

fn post_source(post: &Post) -> String {
    post.external_link
        .as_deref()
        .and_then(source_label)
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

fn sorted_counts(counts: BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

impl Breakdown {
    /// Compute the breakdown for a collection of posts.
    pub fn compute(posts: &[Post]) -> Self {
        let domains: BTreeSet<String> = posts.iter().map(post_source).collect();
        let (social_sources, other_sources): (Vec<String>, Vec<String>) = domains
            .into_iter()
            .partition(|d| SOCIAL_MEDIA_DOMAINS.contains(&d.as_str()));

        let mut per_source: BTreeMap<String, usize> = BTreeMap::new();
        let mut per_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut per_source_engaged: BTreeMap<String, usize> = BTreeMap::new();
        let mut stats = Self {
            profile: posts.first().and_then(|p| p.topics.first().copied()),
            social_sources,
            other_sources,
            total_posts: posts.len(),
            ..Self::default()
        };

        for post in posts {
            *per_source.entry(post_source(post)).or_default() += 1;
            let type_label = post.post_type.clone().unwrap_or_else(|| UNTYPED.to_string());
            *per_type.entry(type_label).or_default() += 1;

            if post.has_content() {
                stats.posts_with_content += 1;
            }
            if post.is_root() {
                stats.root_posts += 1;
            }
            if post.post_type.is_none() && !post.is_root() {
                stats.comments += 1;
            }
            if post.author.full_name.is_some() {
                stats.posts_with_author_name += 1;
            }
            if post.author.avatar.is_some() {
                stats.posts_with_avatar += 1;
            }
            if post.post_type.is_none() && post.has_engagement() {
                stats.engaged_posts += 1;
                *per_source_engaged.entry(post_source(post)).or_default() += 1;
            }
        }

        stats.posts_per_source = sorted_counts(per_source);
        stats.posts_per_type = sorted_counts(per_type);
        stats.engagement_per_source = sorted_counts(per_source_engaged);
        stats
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.profile {
            Some(profile) => writeln!(f, "Profile: {profile}")?,
            None => writeln!(f, "Profile: unknown")?,
        }
        writeln!(f, "Social media sources: {}", self.social_sources.join(", "))?;
        writeln!(f, "Other sources: {}", self.other_sources.join(", "))?;

        writeln!(f, "Posts per source:")?;
        for (source, count) in &self.posts_per_source {
            writeln!(f, "  {source}: {count}")?;
        }

        writeln!(f, "Posts per type:")?;
        for (post_type, count) in &self.posts_per_type {
            writeln!(f, "  {post_type}: {count}")?;
        }

        writeln!(
            f,
            "Total posts: {}, posts with content: {}",
            self.total_posts, self.posts_with_content
        )?;
        writeln!(f, "Root posts: {}", self.root_posts)?;
        writeln!(f, "Comments: {}", self.comments)?;
        writeln!(f, "Posts with author names: {}", self.posts_with_author_name)?;
        writeln!(f, "Posts with avatar links: {}", self.posts_with_avatar)?;
        writeln!(f, "Untyped posts with engagement: {}", self.engaged_posts)?;

        writeln!(f, "Engagement per source:")?;
        for (source, count) in &self.engagement_per_source {
            writeln!(f, "  {source}: {count}")?;
        }
        Ok(())
    }
}

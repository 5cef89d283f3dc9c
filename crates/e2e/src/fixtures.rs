//! Seed data shared by the scenarios
//!
//! Every accessor returns a fresh owned copy. The like helper mutates
//! `Blog::likes` while it generates steps, so two scenarios must never share
//! the same vector.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// An account created through `POST /api/users` before each scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(name: &str, username: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// A post created through the UI create-flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub title: String,
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub likes: u32,
}

impl Blog {
    pub fn new(title: &str, author: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            url: url.to_string(),
            likes: 0,
        }
    }

    /// Text the app renders in the post header, used to locate the post
    pub fn label(&self) -> String {
        format!("{} {}", self.title, self.author)
    }
}

pub fn initial_users() -> Vec<User> {
    vec![
        User::new("Superuser", "root", "hardToGuess"),
        User::new("Testuser", "test", "pa$$word"),
    ]
}

pub fn initial_blogs() -> Vec<Blog> {
    vec![
        Blog::new("A good blog", "Ada Lovelace", "https://www.lovelace.com"),
        Blog::new("What is this?", "Abraham Lincoln", "https://www.lincoln.com"),
        Blog::new("Another blog", "Anonymous", "https://www.anonymous.com"),
    ]
}

/// The account the scenarios log in with. It is one of the seed users.
pub fn test_user() -> User {
    User::new("Testuser", "test", "pa$$word")
}

/// Expected on-screen order: descending likes, ties keep seed order.
pub fn sorted_by_likes(blogs: &[Blog]) -> Vec<Blog> {
    let mut sorted = blogs.to_vec();
    sorted.sort_by(|a, b| b.likes.cmp(&a.likes));
    sorted
}

/// Posts are located by label, so labels must not repeat within a set.
pub fn labels_unique(blogs: &[Blog]) -> bool {
    let mut seen = HashSet::new();
    blogs.iter().all(|b| seen.insert(b.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_sets() {
        let users = initial_users();
        assert_eq!(users.len(), 2);
        assert!(users.contains(&test_user()));

        let blogs = initial_blogs();
        assert_eq!(blogs.len(), 3);
        assert!(blogs.iter().all(|b| b.likes == 0));
        assert!(labels_unique(&blogs));
    }

    #[test]
    fn test_fresh_copies() {
        let mut first = initial_blogs();
        first[0].likes = 7;
        assert_eq!(initial_blogs()[0].likes, 0);
    }

    #[test]
    fn test_label() {
        let blog = &initial_blogs()[1];
        assert_eq!(blog.label(), "What is this? Abraham Lincoln");
    }

    #[test]
    fn test_sorted_by_likes() {
        let mut blogs = initial_blogs();
        blogs[2].likes = 5;
        blogs[1].likes = 3;

        let order: Vec<String> = sorted_by_likes(&blogs).iter().map(|b| b.title.clone()).collect();
        assert_eq!(order, vec!["Another blog", "What is this?", "A good blog"]);
    }

    #[test]
    fn test_sorted_by_likes_keeps_ties_in_seed_order() {
        let blogs = initial_blogs();
        assert_eq!(sorted_by_likes(&blogs), blogs);
    }

    #[test]
    fn test_duplicate_labels_detected() {
        let mut blogs = initial_blogs();
        blogs.push(Blog::new("A good blog", "Ada Lovelace", "https://elsewhere.example"));
        assert!(!labels_unique(&blogs));
    }

    #[test]
    fn test_user_serializes_for_api() {
        let json = serde_json::to_value(test_user()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "Testuser", "username": "test", "password": "pa$$word" })
        );
    }
}

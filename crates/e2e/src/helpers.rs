//! Reusable UI action sequences
//!
//! Every helper returns the steps it would perform. Helpers that change the
//! page end with a wait on the visible effect, so the next step starts from a
//! settled UI.

use crate::fixtures::{labels_unique, Blog};
use crate::locator::Locator;
use crate::spec::{TestStep, WaitState};

/// Open the application root
pub fn open_app() -> Vec<TestStep> {
    vec![TestStep::Navigate { url: String::new() }]
}

/// Fill the login form and submit it. Success or failure is for the caller
/// to assert.
pub fn login_with(username: &str, password: &str) -> Vec<TestStep> {
    vec![
        TestStep::Fill {
            target: Locator::test_id("inputUsername"),
            value: username.to_string(),
        },
        TestStep::Fill {
            target: Locator::test_id("inputPassword"),
            value: password.to_string(),
        },
        TestStep::Click {
            target: Locator::test_id("loginButton"),
        },
    ]
}

/// Log in and wait until the logged-in view is shown
pub fn login_and_wait(username: &str, password: &str) -> Vec<TestStep> {
    let mut steps = login_with(username, password);
    steps.push(TestStep::wait_for(Locator::test_id("loggedDiv")));
    steps
}

pub fn logout() -> Vec<TestStep> {
    vec![
        TestStep::Click {
            target: Locator::button("logout"),
        },
        TestStep::wait_for(Locator::test_id("loginHeader")),
    ]
}

/// Create a post through the form; done once its header is on screen.
pub fn create_blog(blog: &Blog) -> Vec<TestStep> {
    vec![
        TestStep::Click {
            target: Locator::button("new blog"),
        },
        TestStep::Fill {
            target: Locator::test_id("inputTitle"),
            value: blog.title.clone(),
        },
        TestStep::Fill {
            target: Locator::test_id("inputAuthor"),
            value: blog.author.clone(),
        },
        TestStep::Fill {
            target: Locator::test_id("inputUrl"),
            value: blog.url.clone(),
        },
        TestStep::Click {
            target: Locator::test_id("createBlog"),
        },
        TestStep::wait_for(Locator::text(&blog.label())),
    ]
}

/// Create several posts. Their labels must be distinct, or later lookups by
/// label would match more than one post.
pub fn create_blogs(blogs: &[Blog]) -> Vec<TestStep> {
    debug_assert!(labels_unique(blogs), "blog labels must be unique within a set");
    blogs.iter().flat_map(create_blog).collect()
}

/// The `.blog` element holding this post
pub fn blog_locator(blog: &Blog) -> Locator {
    Locator::css(".blog").has_text(&blog.label())
}

pub fn show_blog_details(blog: &Blog) -> Vec<TestStep> {
    let post = blog_locator(blog);
    vec![
        TestStep::Click {
            target: post.clone().child(Locator::button("show")),
        },
        TestStep::wait_for(post.child(Locator::text(&blog.url))),
    ]
}

pub fn hide_blog_details(blog: &Blog) -> Vec<TestStep> {
    let post = blog_locator(blog);
    vec![
        TestStep::Click {
            target: post.clone().child(Locator::button("hide")),
        },
        TestStep::wait_for(post.child(Locator::button("show"))),
    ]
}

/// Like a post `times` times, one confirmed increment per click.
///
/// `blog.likes` is advanced together with every expected count, so after the
/// call it holds what the app should display.
pub fn like_blog(blog: &mut Blog, times: u32) -> Vec<TestStep> {
    let post = blog_locator(blog);
    let mut steps = show_blog_details(blog);

    for _ in 0..times {
        let expected = blog.likes + 1;
        steps.push(TestStep::Click {
            target: post.clone().child(Locator::button("like")),
        });
        steps.push(TestStep::Wait {
            target: post.clone().child(Locator::text(&format!("likes {}", expected))),
            state: WaitState::Visible,
            timeout_ms: None,
            label: Some(format!("likes {} on {}", expected, blog.label())),
        });
        blog.likes = expected;
    }

    steps.extend(hide_blog_details(blog));
    steps
}

//! The blog app scenario tree
//!
//! Each scenario begins from a reset backend with the seed users created, and
//! opens the app root before driving the UI.

use crate::fixtures::{initial_blogs, initial_users, sorted_by_likes, test_user, User};
use crate::helpers::{
    blog_locator, create_blogs, hide_blog_details, like_blog, login_and_wait, login_with, logout,
    open_app, show_blog_details,
};
use crate::locator::Locator;
use crate::spec::{Scenario, TestStep};

const ROOT: &str = "Blog app";

/// Every built-in scenario, in suite order
pub fn blog_app() -> Vec<Scenario> {
    let mut scenarios = vec![login_form_is_shown()];
    scenarios.extend(login());
    scenarios.extend(logout_scenarios());
    scenarios.push(create_several_blogs());
    scenarios.extend(show_blog_details_scenarios());
    scenarios.extend(like_blog_scenarios());
    scenarios.extend(delete_blog_scenarios());
    scenarios
}

fn visible(target: Locator) -> TestStep {
    TestStep::AssertVisible { target }
}

fn hidden(target: Locator) -> TestStep {
    TestStep::AssertHidden { target }
}

/// Open the app, log in as the test user and create the three seed posts
fn logged_in_with_blogs() -> Vec<TestStep> {
    let user = test_user();
    let mut steps = open_app();
    steps.extend(login_and_wait(&user.username, &user.password));
    steps.extend(create_blogs(&initial_blogs()));
    steps
}

fn login_form_is_shown() -> Scenario {
    let mut steps = open_app();
    steps.push(visible(Locator::test_id("loginHeader")));

    Scenario::new(&[ROOT], "Login form is shown")
        .tagged(&["login", "smoke"])
        .with_steps(steps)
}

fn login() -> Vec<Scenario> {
    let suite = [ROOT, "Login"];
    let user = test_user();

    let mut succeeds = open_app();
    succeeds.extend(login_with(&user.username, &user.password));
    succeeds.push(visible(Locator::test_id("loggedDiv")));

    let notification = Locator::test_id("notification");
    let mut fails = open_app();
    fails.extend(login_with(&user.username, "wrong"));
    fails.extend([
        TestStep::AssertText {
            target: notification.clone(),
            contains: "invalid username or password".to_string(),
        },
        TestStep::AssertCss {
            target: notification.clone(),
            property: "border".to_string(),
            value: "2px solid rgb(255, 0, 0)".to_string(),
        },
        TestStep::AssertCss {
            target: notification,
            property: "color".to_string(),
            value: "rgb(255, 0, 0)".to_string(),
        },
        hidden(Locator::test_id("loggedDiv")),
    ]);

    vec![
        Scenario::new(&suite, "succeeds with correct credentials")
            .tagged(&["login", "smoke"])
            .with_steps(succeeds),
        Scenario::new(&suite, "fails with wrong credentials")
            .tagged(&["login"])
            .with_steps(fails),
    ]
}

fn logout_scenarios() -> Vec<Scenario> {
    let suite = [ROOT, "Logout"];
    let user = test_user();

    let mut clicked = open_app();
    clicked.extend(login_with(&user.username, &user.password));
    clicked.push(visible(Locator::test_id("loggedDiv")));
    clicked.push(TestStep::Click {
        target: Locator::button("logout"),
    });
    clicked.push(visible(Locator::test_id("loginHeader")));

    let mut scenarios = vec![Scenario::new(&suite, "when logout button is clicked")
        .tagged(&["login"])
        .with_steps(clicked)];
    scenarios.extend(initial_users().iter().map(|u| login_logout_cycle(&suite, u)));
    scenarios
}

/// Logging in and out again returns to the login form
fn login_logout_cycle(suite: &[&str], user: &User) -> Scenario {
    let mut steps = open_app();
    steps.push(visible(Locator::test_id("loginHeader")));
    steps.push(hidden(Locator::test_id("loggedDiv")));
    steps.extend(login_and_wait(&user.username, &user.password));
    steps.extend(logout());
    steps.push(visible(Locator::test_id("loginHeader")));
    steps.push(hidden(Locator::test_id("loggedDiv")));

    Scenario::new(suite, &format!("login and logout cycle for {}", user.username))
        .tagged(&["login"])
        .with_steps(steps)
}

fn create_several_blogs() -> Scenario {
    let mut steps = logged_in_with_blogs();
    for blog in initial_blogs() {
        let header = Locator::text(&blog.label());
        steps.push(visible(header.clone()));
        steps.push(TestStep::AssertCount {
            target: header,
            count: 1,
        });
    }

    Scenario::new(&[ROOT, "Blog Functions", "Create Function"], "several blogs can be created when logged in")
        .tagged(&["blogs", "create"])
        .with_steps(steps)
}

fn show_blog_details_scenarios() -> Vec<Scenario> {
    let suite = [ROOT, "Blog Functions", "Show blog details"];
    let blogs = initial_blogs();
    let test_blog = &blogs[0];

    let mut hidden_by_default = logged_in_with_blogs();
    for blog in &blogs {
        let post = blog_locator(blog);
        hidden_by_default.extend([
            hidden(Locator::text(&blog.url)),
            hidden(post.clone().child(Locator::text(&format!("likes {}", blog.likes)))),
            hidden(post.child(Locator::exact_text(&test_user().name))),
        ]);
    }

    let mut shown = logged_in_with_blogs();
    shown.extend(show_blog_details(test_blog));
    shown.extend([
        visible(Locator::text(&test_blog.url)),
        visible(Locator::text(&format!("likes {}", test_blog.likes))),
        visible(Locator::exact_text(&test_user().name)),
    ]);

    let mut hidden_again = logged_in_with_blogs();
    hidden_again.extend(show_blog_details(test_blog));
    hidden_again.extend(hide_blog_details(test_blog));
    hidden_again.extend([
        hidden(Locator::text(&test_blog.url)),
        hidden(Locator::text(&format!("likes {}", test_blog.likes))),
        hidden(blog_locator(test_blog).child(Locator::exact_text(&test_user().name))),
    ]);

    vec![
        Scenario::new(&suite, "details are hidden if button has not been clicked")
            .tagged(&["blogs", "details"])
            .with_steps(hidden_by_default),
        Scenario::new(&suite, "when show button is clicked")
            .tagged(&["blogs", "details"])
            .with_steps(shown),
        Scenario::new(&suite, "when hide button is clicked")
            .tagged(&["blogs", "details"])
            .with_steps(hidden_again),
    ]
}

fn like_blog_scenarios() -> Vec<Scenario> {
    let suite = [ROOT, "Blog Functions", "Like blog"];

    let mut blogs = initial_blogs();
    let mut clicked = logged_in_with_blogs();
    clicked.extend(like_blog(&mut blogs[0], 1));

    let mut blogs = initial_blogs();
    let mut ordered = logged_in_with_blogs();
    ordered.extend(like_blog(&mut blogs[2], 5));
    ordered.extend(like_blog(&mut blogs[1], 3));

    let expected = sorted_by_likes(&blogs);
    let headers = Locator::css(".blogHeader");
    ordered.push(TestStep::AssertCount {
        target: headers.clone(),
        count: expected.len(),
    });
    for (index, blog) in expected.iter().enumerate() {
        ordered.push(visible(headers.clone().nth(index).child(Locator::text(&blog.label()))));
    }

    vec![
        Scenario::new(&suite, "when like button is clicked")
            .tagged(&["blogs", "likes"])
            .with_steps(clicked),
        Scenario::new(&suite, "several blogs created are arranged in the order according the likes")
            .tagged(&["blogs", "likes"])
            .with_steps(ordered),
    ]
}

fn delete_blog_scenarios() -> Vec<Scenario> {
    let suite = [ROOT, "Blog Functions", "Delete blog"];
    let test_blog = initial_blogs().remove(0);
    let other_user = initial_users().remove(0);
    let delete = Locator::button("delete");

    let mut setup = logged_in_with_blogs();
    setup.extend(show_blog_details(&test_blog));

    let mut not_creator = setup.clone();
    not_creator.extend(logout());
    not_creator.extend(login_and_wait(&other_user.username, &other_user.password));
    not_creator.extend(show_blog_details(&test_blog));
    not_creator.push(hidden(delete.clone()));

    let mut creator = setup;
    creator.extend([
        visible(delete.clone()),
        TestStep::AcceptDialogs,
        TestStep::Click { target: delete },
        hidden(blog_locator(&test_blog)),
    ]);

    vec![
        Scenario::new(&suite, "when logged user is not creator of blog delete button is hidden")
            .tagged(&["blogs", "delete"])
            .with_steps(not_creator),
        Scenario::new(&suite, "when delete button is clicked")
            .tagged(&["blogs", "delete"])
            .with_steps(creator),
    ]
}

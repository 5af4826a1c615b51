use chrono::{DateTime, Utc};

use super::post::Post;
use super::viewer::Viewer;

/// Published, not scheduled for the future and not inside a hidden category.
pub(crate) fn is_publicly_visible(post: &Post, now: DateTime<Utc>) -> bool {
    post.is_published
        && post.pub_date <= now
        && post
            .category
            .as_ref()
            .is_none_or(|category| category.is_published)
}

/// The author always sees their own post; everybody else only public ones.
pub(crate) fn is_visible_to(post: &Post, viewer: &Viewer, now: DateTime<Utc>) -> bool {
    viewer.is(post.author_id) || is_publicly_visible(post, now)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::{is_publicly_visible, is_visible_to};
    use crate::domain::catalog::CategoryRef;
    use crate::domain::post::Post;
    use crate::domain::viewer::Viewer;

    const AUTHOR: i64 = 1;
    const OTHER: i64 = 2;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 21, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn post(is_published: bool, pub_date: DateTime<Utc>, category: Option<bool>) -> Post {
        Post {
            id: 1,
            title: "title".to_string(),
            text: "text".to_string(),
            image: None,
            pub_date,
            is_published,
            author_id: AUTHOR,
            author_username: "author".to_string(),
            category: category.map(|is_published| CategoryRef {
                id: 5,
                title: "Travel".to_string(),
                slug: "travel".to_string(),
                is_published,
            }),
            location: None,
            created_at: now() - Duration::days(2),
            updated_at: now() - Duration::days(2),
        }
    }

    fn non_owners() -> [Viewer; 2] {
        [Viewer::Anonymous, Viewer::User(OTHER)]
    }

    #[test]
    fn published_past_post_is_visible_to_everybody() {
        let post = post(true, now() - Duration::days(1), Some(true));
        assert!(is_publicly_visible(&post, now()));
        for viewer in non_owners() {
            assert!(is_visible_to(&post, &viewer, now()));
        }
    }

    #[test]
    fn post_without_category_can_be_public() {
        let post = post(true, now() - Duration::hours(1), None);
        assert!(is_visible_to(&post, &Viewer::Anonymous, now()));
    }

    #[test]
    fn pub_date_equal_to_now_is_visible() {
        let post = post(true, now(), None);
        assert!(is_publicly_visible(&post, now()));
    }

    #[test]
    fn unpublished_post_is_only_visible_to_owner() {
        let post = post(false, now() - Duration::days(1), Some(true));
        for viewer in non_owners() {
            assert!(!is_visible_to(&post, &viewer, now()));
        }
        assert!(is_visible_to(&post, &Viewer::User(AUTHOR), now()));
    }

    #[test]
    fn future_post_is_only_visible_to_owner() {
        let post = post(true, now() + Duration::days(1), Some(true));
        for viewer in non_owners() {
            assert!(!is_visible_to(&post, &viewer, now()));
        }
        assert!(is_visible_to(&post, &Viewer::User(AUTHOR), now()));
    }

    #[test]
    fn post_in_hidden_category_is_only_visible_to_owner() {
        let post = post(true, now() - Duration::days(1), Some(false));
        for viewer in non_owners() {
            assert!(!is_visible_to(&post, &viewer, now()));
        }
        assert!(is_visible_to(&post, &Viewer::User(AUTHOR), now()));
    }

    #[test]
    fn predicate_is_stable_for_same_inputs() {
        let cases = [
            post(true, now() - Duration::days(1), Some(true)),
            post(false, now() - Duration::days(1), None),
            post(true, now() + Duration::seconds(1), Some(true)),
            post(true, now() - Duration::days(1), Some(false)),
        ];
        let viewers = [Viewer::Anonymous, Viewer::User(OTHER), Viewer::User(AUTHOR)];

        for post in &cases {
            for viewer in &viewers {
                let first = is_visible_to(post, viewer, now());
                for _ in 0..3 {
                    assert_eq!(is_visible_to(post, viewer, now()), first);
                }
            }
        }
    }
}

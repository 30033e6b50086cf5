//! Stateless helpers used by the views.

use crate::domain::Post;
use crate::forms::EmailPostForm;
use crate::ports::{MailError, Mailer, OutgoingMail};

/// Compose the "recommends you read" message for a cleaned share form.
pub fn compose_recommendation(post: &Post, form: &EmailPostForm, post_url: &str) -> OutgoingMail {
    let subject = format!(
        "{} ({}) recommends you read {}",
        form.name, form.email, post.title
    );
    let body = format!(
        "Read {} at {}\n\n{}'s comments: {}",
        post.title, post_url, form.name, form.comments
    );

    OutgoingMail {
        subject,
        body,
        from: None,
        to: vec![form.to.clone()],
    }
}

/// Send a post recommendation through `mailer`.
pub async fn send_post_recommendation(
    mailer: &dyn Mailer,
    post: &Post,
    form: &EmailPostForm,
    post_url: &str,
) -> Result<(), MailError> {
    mailer
        .send(compose_recommendation(post, form, post_url))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_compose_recommendation() {
        let post = Post::new(Uuid::new_v4(), "Ownership", "body");
        let form = EmailPostForm {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            to: "bob@example.com".to_string(),
            comments: "Worth it".to_string(),
        };

        let mail = compose_recommendation(&post, &form, "http://testserver/blog/2024/1/2/ownership/");

        assert_eq!(
            mail.subject,
            "Ann (ann@example.com) recommends you read Ownership"
        );
        assert_eq!(
            mail.body,
            "Read Ownership at http://testserver/blog/2024/1/2/ownership/\n\nAnn's comments: Worth it"
        );
        assert_eq!(mail.to, vec!["bob@example.com".to_string()]);
        assert_eq!(mail.from, None);
    }
}

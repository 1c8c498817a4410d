use shared::domain::Comment;

pub const INTERNAL_BADGE: &str = r#"<span class="badge badge-info">Internal</span>"#;

pub fn render_comment(comment: &Comment) -> String {
    let class = if comment.is_internal {
        "comment-item comment-internal"
    } else {
        "comment-item"
    };
    let badge = if comment.is_internal { INTERNAL_BADGE } else { "" };

    format!(
        concat!(
            r#"<div class="{class}">"#,
            r#"<div class="comment-header">"#,
            "<strong>{author}</strong>{badge}",
            r#"<span class="comment-time">{created_at}</span>"#,
            "</div>",
            r#"<div class="comment-body">{body}</div>"#,
            "</div>"
        ),
        class = class,
        author = escape_html(&comment.author),
        badge = badge,
        created_at = escape_html(&comment.created_at),
        body = escape_html(&comment.text)
            .replace("\r\n", "<br>")
            .replace('\n', "<br>"),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

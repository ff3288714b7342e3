use super::{filters, urls};
use crate::blog::{Comment, Group, Post, User};
use crate::state::session::CurrentUser;
use crate::thumbnail::Thumbnail;
use askama::Template;

const TITLE_CHARS: usize = 30;

pub const FIELD_REQUIRED: &str = "This field is required.";

/// Everything the post detail page is rendered from
#[derive(Debug, Clone, Copy)]
pub struct PostDetailContext<'a> {
    pub post: &'a Post,
    pub author: &'a User,
    pub group: Option<&'a Group>,
    pub thumbnail: Option<&'a Thumbnail>,
    pub comments: &'a [Comment],
    pub form: &'a CommentForm,
    pub user: &'a CurrentUser,
}

/// The comment form, either empty or bound to a submitted value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentForm {
    pub text: String,
    pub errors: Vec<&'static str>,
}

impl CommentForm {
    pub fn bound(text: String) -> Self {
        CommentForm {
            text,
            errors: Vec::new(),
        }
    }

    /// `Ok` with the cleaned text, or the form carrying its errors
    pub fn validate(mut self) -> Result<String, CommentForm> {
        let text = self.text.trim();
        if text.is_empty() {
            self.errors.push(FIELD_REQUIRED);
            return Err(self);
        }
        Ok(text.to_owned())
    }
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
struct PostDetailTemplate<'a> {
    title: String,
    pub_date: String,
    group: Option<GroupLink<'a>>,
    author_url: String,
    author_name: &'a str,
    author_post_count: usize,
    thumbnail: Option<&'a Thumbnail>,
    paragraphs: Vec<Vec<String>>,
    edit_url: Option<String>,
    comment_form: Option<CommentFormView<'a>>,
    comments: Vec<CommentView<'a>>,
}

struct GroupLink<'a> {
    url: String,
    title: &'a str,
}

struct CommentFormView<'a> {
    action: String,
    csrf_token: &'a str,
    text: &'a str,
    errors: &'a [&'static str],
}

struct CommentView<'a> {
    author_url: String,
    author_username: &'a str,
    text: &'a str,
}

impl<'a> PostDetailTemplate<'a> {
    fn new(ctx: &PostDetailContext<'a>) -> Self {
        let post = ctx.post;

        let comment_form = ctx.user.is_authenticated().then(|| CommentFormView {
            action: urls::add_comment(&post.id),
            csrf_token: ctx.user.csrf_token().unwrap_or_default(),
            text: &ctx.form.text,
            errors: &ctx.form.errors,
        });

        PostDetailTemplate {
            title: filters::truncate_chars(&post.text, TITLE_CHARS),
            pub_date: filters::format_pub_date(&post.pub_date),
            group: ctx.group.map(|group| GroupLink {
                url: urls::group_list(&group.slug),
                title: &group.title,
            }),
            author_url: urls::profile(&ctx.author.username),
            author_name: ctx.author.full_name().unwrap_or_default(),
            author_post_count: ctx.author.post_count(),
            thumbnail: ctx.thumbnail,
            paragraphs: filters::paragraphs(&post.text),
            edit_url: ctx.user.is(ctx.author).then(|| urls::post_edit(&post.id)),
            comment_form,
            comments: ctx
                .comments
                .iter()
                .map(|comment| CommentView {
                    author_url: urls::profile(&comment.author_username),
                    author_username: &comment.author_username,
                    text: &comment.text,
                })
                .collect(),
        }
    }
}

pub fn render(ctx: &PostDetailContext<'_>) -> Result<String, askama::Error> {
    PostDetailTemplate::new(ctx).render()
}

use urlencoding::encode;

pub fn post_detail(post_id: &str) -> String {
    format!("/posts/{}", encode(post_id))
}

pub fn post_edit(post_id: &str) -> String {
    format!("/posts/{}/edit", encode(post_id))
}

pub fn add_comment(post_id: &str) -> String {
    format!("/posts/{}/comment", encode(post_id))
}

pub fn group_list(slug: &str) -> String {
    format!("/group/{}", encode(slug))
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}", encode(username))
}

pub fn post_image_thumb(post_id: &str, image_name: &str, geometry: &str) -> String {
    format!(
        "/media/post/{}/{}?thumb={}",
        encode(post_id),
        encode(image_name),
        encode(geometry)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(profile("leo"), "/profile/leo");
        assert_eq!(group_list("a b"), "/group/a%20b");
        assert_eq!(
            post_image_thumb("0abc", "my cat.png", "x700"),
            "/media/post/0abc/my%20cat.png?thumb=x700"
        );
    }
}

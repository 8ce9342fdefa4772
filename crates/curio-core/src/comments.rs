//! Threaded comments. Rows are stored flat with an optional parent and are
//! assembled into a depth-bounded tree on read.

use std::collections::HashMap;

use curio_db::Database;
use curio_db::comments::CommentInsert;
use curio_db::models::CommentRow;
use curio_types::models::{Comment, CommentId, CommentNode, ProductId, UserId};
use tracing::info;

use crate::error::{CoreError, CoreResult, require_user};
use crate::validate;

/// Number of nesting levels rendered in a thread. Depth 0 is a top-level
/// comment, so depths `0..MAX_THREAD_DEPTH` are kept.
pub const MAX_THREAD_DEPTH: usize = 6;

pub fn create_comment(
    db: &Database,
    acting: Option<UserId>,
    product_id: ProductId,
    content: &str,
    parent_id: Option<CommentId>,
) -> CoreResult<Comment> {
    let user_id = require_user(acting)?;
    let content = validate::comment_content(content)?;

    let id = match db.insert_comment(user_id, product_id, &content, parent_id)? {
        CommentInsert::Inserted(id) => id,
        CommentInsert::MissingProduct => return Err(CoreError::not_found("product", product_id)),
        CommentInsert::MissingParent(parent) => return Err(CoreError::not_found("comment", parent)),
        CommentInsert::ForeignParent(parent) => {
            return Err(CoreError::invalid(format!(
                "parent comment {parent} belongs to another product"
            )));
        }
    };
    info!("Comment {} on product {} by user {}", id, product_id, user_id);
    get_comment(db, id)
}

pub fn get_comment(db: &Database, comment_id: CommentId) -> CoreResult<Comment> {
    db.get_comment(comment_id)?
        .map(CommentRow::into_comment)
        .ok_or_else(|| CoreError::not_found("comment", comment_id))
}

/// Every comment on the product, flat, in creation order.
pub fn list_comments(db: &Database, product_id: ProductId) -> CoreResult<Vec<Comment>> {
    Ok(db
        .list_comments(product_id)?
        .into_iter()
        .map(CommentRow::into_comment)
        .collect())
}

pub fn get_thread(db: &Database, product_id: ProductId) -> CoreResult<Vec<CommentNode>> {
    Ok(build_thread(&list_comments(db, product_id)?))
}

/// Rebuilds discussion threads from a flat comment list.
///
/// Roots are comments without a parent. A node's replies are the comments
/// naming it as parent on the same product, oldest first. Nodes deeper than
/// [`MAX_THREAD_DEPTH`] levels are dropped, as are blank comments together
/// with everything hanging below them. Nothing here touches storage.
pub fn build_thread(comments: &[Comment]) -> Vec<CommentNode> {
    let mut children: HashMap<Option<CommentId>, Vec<&Comment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent_id).or_default().push(comment);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }

    children
        .get(&None)
        .map(|roots| {
            roots
                .iter()
                .filter_map(|root| build_node(root, 0, &children))
                .collect()
        })
        .unwrap_or_default()
}

fn build_node(
    comment: &Comment,
    depth: usize,
    children: &HashMap<Option<CommentId>, Vec<&Comment>>,
) -> Option<CommentNode> {
    if depth >= MAX_THREAD_DEPTH || comment.content.trim().is_empty() {
        return None;
    }

    let replies = children
        .get(&Some(comment.id))
        .map(|kids| {
            kids.iter()
                .filter(|kid| kid.product_id == comment.product_id)
                .filter_map(|kid| build_node(kid, depth + 1, children))
                .collect()
        })
        .unwrap_or_default();

    Some(CommentNode {
        comment: comment.clone(),
        depth,
        replies,
    })
}

pub fn edit_comment(
    db: &Database,
    acting: Option<UserId>,
    comment_id: CommentId,
    content: &str,
) -> CoreResult<Comment> {
    let user_id = require_user(acting)?;
    let current = get_comment(db, comment_id)?;
    if current.user_id != user_id {
        return Err(CoreError::forbidden("only the author can edit this comment"));
    }
    let content = validate::comment_content(content)?;

    db.update_comment_content(comment_id, &content)?;
    get_comment(db, comment_id)
}

/// Deletes a comment without replies. A comment that has been replied to
/// stays in place so its thread is not broken, and the call fails with
/// `Conflict`.
pub fn delete_comment(
    db: &Database,
    acting: Option<UserId>,
    comment_id: CommentId,
) -> CoreResult<()> {
    let user_id = require_user(acting)?;
    let current = get_comment(db, comment_id)?;
    if current.user_id != user_id {
        return Err(CoreError::forbidden("only the author can delete this comment"));
    }

    if !db.delete_leaf_comment(comment_id)? {
        return Err(CoreError::Conflict(format!(
            "comment {comment_id} has replies and cannot be deleted"
        )));
    }
    info!("Comment {} deleted by user {}", comment_id, user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use chrono::{DateTime, Duration, Utc};

    fn raw(id: CommentId, parent_id: Option<CommentId>, content: &str) -> Comment {
        Comment {
            id,
            content: content.into(),
            user_id: 1,
            product_id: 1,
            parent_id,
            created_at: DateTime::<Utc>::default() + Duration::seconds(id),
            updated_at: None,
        }
    }

    fn depths(nodes: &[CommentNode], out: &mut Vec<(CommentId, usize)>) {
        for node in nodes {
            out.push((node.comment.id, node.depth));
            depths(&node.replies, out);
        }
    }

    #[test]
    fn chain_is_cut_after_six_levels() {
        // C1 is top level, C(n+1) replies to C(n), ten deep.
        let comments: Vec<Comment> = (1..=10)
            .map(|id| raw(id, if id == 1 { None } else { Some(id - 1) }, "reply"))
            .collect();

        let mut seen = Vec::new();
        depths(&build_thread(&comments), &mut seen);
        assert_eq!(seen, vec![(1, 0), (2, 1), (3, 2), (4, 3), (5, 4), (6, 5)]);
    }

    #[test]
    fn blank_comments_hide_their_subtree() {
        let comments = vec![
            raw(1, None, "root"),
            raw(2, Some(1), "   "),
            raw(3, Some(2), "under blank"),
            raw(4, Some(1), "visible"),
            raw(5, None, ""),
        ];

        let thread = build_thread(&comments);
        assert_eq!(thread.len(), 1);
        let replies: Vec<_> = thread[0].replies.iter().map(|n| n.comment.id).collect();
        assert_eq!(replies, vec![4]);
    }

    #[test]
    fn siblings_sorted_oldest_first() {
        let mut comments = vec![raw(3, None, "c"), raw(1, None, "a"), raw(2, Some(1), "b")];
        comments.push(raw(4, Some(1), "d"));
        comments.swap(2, 3);

        let thread = build_thread(&comments);
        let roots: Vec<_> = thread.iter().map(|n| n.comment.id).collect();
        assert_eq!(roots, vec![1, 3]);
        let replies: Vec<_> = thread[0].replies.iter().map(|n| n.comment.id).collect();
        assert_eq!(replies, vec![2, 4]);
    }

    #[test]
    fn replies_on_other_products_are_ignored() {
        let mut stray = raw(2, Some(1), "elsewhere");
        stray.product_id = 2;
        let thread = build_thread(&[raw(1, None, "root"), stray]);
        assert!(thread[0].replies.is_empty());
    }

    #[test]
    fn stored_chain_keeps_deep_replies_in_flat_list() {
        let db = testutil::db();
        let user = testutil::user(&db, "critic");
        let p = testutil::product(&db, user);

        let mut parent = None;
        let mut ids = Vec::new();
        for depth in 0..7 {
            let c = create_comment(&db, Some(user), p, &format!("level {depth}"), parent).unwrap();
            parent = Some(c.id);
            ids.push(c.id);
        }

        assert_eq!(list_comments(&db, p).unwrap().len(), 7);
        let mut seen = Vec::new();
        depths(&get_thread(&db, p).unwrap(), &mut seen);
        let rendered: Vec<_> = seen.iter().map(|(id, _)| *id).collect();
        assert_eq!(rendered, ids[..6].to_vec());
    }

    #[test]
    fn create_validates_input() {
        let db = testutil::db();
        let user = testutil::user(&db, "critic");
        let p = testutil::product(&db, user);
        let q = testutil::product(&db, user);
        let other = create_comment(&db, Some(user), q, "on q", None).unwrap();

        assert!(matches!(create_comment(&db, None, p, "hi", None), Err(CoreError::Unauthenticated)));
        assert!(matches!(
            create_comment(&db, Some(user), p, "  ", None),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            create_comment(&db, Some(user), 999, "hi", None),
            Err(CoreError::NotFound { what: "product", .. })
        ));
        assert!(matches!(
            create_comment(&db, Some(user), p, "hi", Some(999)),
            Err(CoreError::NotFound { what: "comment", .. })
        ));
        assert!(matches!(
            create_comment(&db, Some(user), p, "hi", Some(other.id)),
            Err(CoreError::InvalidArgument(_))
        ));

        let top = create_comment(&db, Some(user), p, "  hello  ", None).unwrap();
        assert_eq!(top.content, "hello");
        assert_eq!(top.parent_id, None);
    }

    #[test]
    fn edit_and_delete_are_author_only() {
        let db = testutil::db();
        let author = testutil::user(&db, "author");
        let other = testutil::user(&db, "other");
        let p = testutil::product(&db, author);
        let root = create_comment(&db, Some(author), p, "root", None).unwrap();
        let reply = create_comment(&db, Some(other), p, "reply", Some(root.id)).unwrap();

        assert!(matches!(
            edit_comment(&db, Some(other), root.id, "hijack"),
            Err(CoreError::Forbidden(_))
        ));
        assert!(matches!(
            edit_comment(&db, Some(author), root.id, " "),
            Err(CoreError::InvalidArgument(_))
        ));
        let edited = edit_comment(&db, Some(author), root.id, "root, edited").unwrap();
        assert_eq!(edited.content, "root, edited");
        assert!(edited.updated_at.is_some());

        assert!(matches!(delete_comment(&db, Some(other), root.id), Err(CoreError::Forbidden(_))));
        assert!(matches!(delete_comment(&db, Some(author), root.id), Err(CoreError::Conflict(_))));

        delete_comment(&db, Some(other), reply.id).unwrap();
        delete_comment(&db, Some(author), root.id).unwrap();
        assert!(matches!(
            delete_comment(&db, Some(author), root.id),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn comment_on_deleted_product_is_not_found() {
        let db = testutil::db();
        let user = testutil::user(&db, "critic");
        let p = testutil::product(&db, user);
        let q = testutil::product(&db, user);
        let root = create_comment(&db, Some(user), p, "root", None).unwrap();
        crate::products::delete_product(&db, Some(user), p).unwrap();

        assert!(matches!(
            create_comment(&db, Some(user), p, "late", None),
            Err(CoreError::NotFound { what: "product", .. })
        ));
        assert!(matches!(
            create_comment(&db, Some(user), q, "late reply", Some(root.id)),
            Err(CoreError::NotFound { what: "comment", .. })
        ));
    }
}

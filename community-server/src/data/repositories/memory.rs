//! Process-local store implementing every repository trait, used by service
//! and router tests. It mirrors the Postgres schema rules that matter to
//! callers: unique username/email, cascading deletes, published-only post
//! search and case-insensitive matching.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::comment_repository::{CommentFilter, CommentRepository, NewComment};
use crate::data::pagination::{Page, PageRequest, SortDirection, SortField};
use crate::data::post_repository::{NewPost, PostFilter, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::{Role, User};

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, UserCredentials>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store mutex poisoned")
    }

    pub(crate) fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }
}

trait Sortable {
    fn id(&self) -> i64;
    fn compare_by(&self, other: &Self, field: SortField) -> Ordering;
}

impl Sortable for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::CreatedAt => self.created_at.cmp(&other.created_at),
            SortField::UpdatedAt => self.updated_at.cmp(&other.updated_at),
            SortField::Username => self.username.cmp(&other.username),
            SortField::Email => self.email.cmp(&other.email),
            SortField::FirstName => self.first_name.cmp(&other.first_name),
            SortField::LastName => self.last_name.cmp(&other.last_name),
            SortField::Id | SortField::Title => Ordering::Equal,
        }
    }
}

impl Sortable for Post {
    fn id(&self) -> i64 {
        self.id
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::CreatedAt => self.created_at.cmp(&other.created_at),
            SortField::UpdatedAt => self.updated_at.cmp(&other.updated_at),
            SortField::Title => self.title.cmp(&other.title),
            _ => Ordering::Equal,
        }
    }
}

impl Sortable for Comment {
    fn id(&self) -> i64 {
        self.id
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::CreatedAt => self.created_at.cmp(&other.created_at),
            SortField::UpdatedAt => self.updated_at.cmp(&other.updated_at),
            _ => Ordering::Equal,
        }
    }
}

fn paginate<T: Sortable>(mut items: Vec<T>, request: &PageRequest) -> Page<T> {
    let field = request.sort.field;
    items.sort_by(|a, b| {
        let ord = a.compare_by(b, field).then_with(|| a.id().cmp(&b.id()));
        match request.sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let total = items.len() as i64;
    let window = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .collect();
    Page::new(window, request, total)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.values().any(|c| c.user.username == input.username) {
            return Err(DomainError::Conflict("username"));
        }
        if state.users.values().any(|c| c.user.email == input.email) {
            return Err(DomainError::Conflict("email"));
        }

        let now = Utc::now();
        let id = state.next_id();
        let user = User {
            id,
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(
            id,
            UserCredentials {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.lock().users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|c| c.user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, DomainError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|c| c.user.id != user.id && c.user.email == user.email)
        {
            return Err(DomainError::Conflict("email"));
        }
        let Some(stored) = state.users.get_mut(&user.id) else {
            return Ok(None);
        };
        stored.user.email = user.email.clone();
        stored.user.first_name = user.first_name.clone();
        stored.user.last_name = user.last_name.clone();
        stored.user.role = user.role;
        stored.user.is_active = user.is_active;
        stored.user.updated_at = Utc::now();
        Ok(Some(stored.user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.posts.retain(|_, post| post.author_id != id);
        let State {
            posts, comments, ..
        } = &mut *state;
        comments.retain(|_, c| c.author_id != id && posts.contains_key(&c.post_id));
        Ok(true)
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        let users = self.lock().users.values().map(|c| c.user.clone()).collect();
        Ok(paginate(users, &page))
    }

    async fn search_users(&self, term: &str, page: PageRequest) -> Result<Page<User>, DomainError> {
        let users = self
            .lock()
            .users
            .values()
            .map(|c| &c.user)
            .filter(|u| {
                contains_ignore_case(&u.username, term)
                    || u.first_name.as_deref().is_some_and(|n| contains_ignore_case(n, term))
                    || u.last_name.as_deref().is_some_and(|n| contains_ignore_case(n, term))
            })
            .cloned()
            .collect();
        Ok(paginate(users, &page))
    }

    async fn list_active_by_role(&self, role: Role) -> Result<Vec<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .values()
            .map(|c| &c.user)
            .filter(|u| u.role == role && u.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        let author_username = state
            .users
            .get(&input.author_id)
            .map(|c| c.user.username.clone())
            .ok_or(DomainError::not_found("user", input.author_id))?;

        let now = Utc::now();
        let id = state.next_id();
        let post = Post {
            id,
            title: input.title,
            content: input.content,
            is_published: input.is_published,
            author_id: input.author_id,
            author_username,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.get(&id).cloned())
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        let Some(stored) = state.posts.get_mut(&post.id) else {
            return Ok(None);
        };
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.is_published = post.is_published;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| c.post_id != id);
        Ok(true)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let posts = self
            .lock()
            .posts
            .values()
            .filter(|p| !filter.published_only || p.is_published)
            .filter(|p| filter.author_id.is_none_or(|author| p.author_id == author))
            .cloned()
            .collect();
        Ok(paginate(posts, &page))
    }

    async fn search_published(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let posts = self
            .lock()
            .posts
            .values()
            .filter(|p| p.is_published)
            .filter(|p| contains_ignore_case(&p.title, term) || contains_ignore_case(&p.content, term))
            .cloned()
            .collect();
        Ok(paginate(posts, &page))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.contains_key(&input.post_id) {
            return Err(DomainError::not_found("post", input.post_id));
        }
        let author_username = state
            .users
            .get(&input.author_id)
            .map(|c| c.user.username.clone())
            .ok_or(DomainError::not_found("user", input.author_id))?;

        let now = Utc::now();
        let id = state.next_id();
        let comment = Comment {
            id,
            content: input.content,
            post_id: input.post_id,
            author_id: input.author_id,
            author_username,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        Ok(self.lock().comments.get(&id).cloned())
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Option<Comment>, DomainError> {
        let mut state = self.lock();
        let Some(stored) = state.comments.get_mut(&comment.id) else {
            return Ok(None);
        };
        stored.content = comment.content.clone();
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.lock().comments.remove(&id).is_some())
    }

    async fn list_comments(
        &self,
        filter: CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let comments = self
            .lock()
            .comments
            .values()
            .filter(|c| filter.post_id.is_none_or(|post| c.post_id == post))
            .filter(|c| filter.author_id.is_none_or(|author| c.author_id == author))
            .cloned()
            .collect();
        Ok(paginate(comments, &page))
    }

    async fn search_comments(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let comments = self
            .lock()
            .comments
            .values()
            .filter(|c| contains_ignore_case(&c.content, term))
            .cloned()
            .collect();
        Ok(paginate(comments, &page))
    }
}

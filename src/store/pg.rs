use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::PgPool;
use crate::models::{
    Chat, ChatChangeset, ChatPermission, ChatRole, ChatUser, Member, Membership, Message,
    MessageFile, MessageWithFiles, NewChat, NewMessage, NewTask, RoleWithPermissions, Task,
    TaskFile, TaskListEntry, TaskStatus, TaskWithFiles,
};
use crate::paging::Page;
use crate::schema::{
    chat_permissions, chat_role_permissions, chat_roles, chat_users, chats, message_files,
    messages, task_files, task_statuses, tasks,
};

use super::{MembershipStore, MessageStore, RoleStore, StoreError, StoreResult, TaskStore};

type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Diesel-backed implementation of every storage trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<PgPooledConnection> {
        self.pool
            .get()
            .map_err(|err| StoreError::Pool(err.to_string()))
    }
}

fn classify(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::Conflict(format!("already exists: {}", info.message()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreError::Conflict(format!("still referenced: {}", info.message()))
        }
        other => StoreError::Database(other),
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn load_permissions(
    conn: &mut PgConnection,
    role_ids: &[i32],
) -> StoreResult<HashMap<i32, Vec<ChatPermission>>> {
    let rows: Vec<(i32, ChatPermission)> = chat_role_permissions::table
        .inner_join(chat_permissions::table)
        .filter(chat_role_permissions::chat_role_id.eq_any(role_ids))
        .order(chat_permissions::id.asc())
        .select((
            chat_role_permissions::chat_role_id,
            ChatPermission::as_select(),
        ))
        .load(conn)?;

    let mut grouped: HashMap<i32, Vec<ChatPermission>> = HashMap::new();
    for (role_id, permission) in rows {
        grouped.entry(role_id).or_default().push(permission);
    }
    Ok(grouped)
}

fn with_permissions(conn: &mut PgConnection, role: ChatRole) -> StoreResult<RoleWithPermissions> {
    let mut grouped = load_permissions(conn, &[role.id])?;
    Ok(RoleWithPermissions {
        permissions: grouped.remove(&role.id).unwrap_or_default(),
        id: role.id,
        name: role.name,
    })
}

fn load_message_files(
    conn: &mut PgConnection,
    message_ids: &[Uuid],
) -> StoreResult<HashMap<Uuid, Vec<i32>>> {
    let rows: Vec<MessageFile> = message_files::table
        .filter(message_files::message_id.eq_any(message_ids))
        .order(message_files::file_id.asc())
        .select(MessageFile::as_select())
        .load(conn)?;

    let mut grouped: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for row in rows {
        grouped.entry(row.message_id).or_default().push(row.file_id);
    }
    Ok(grouped)
}

fn load_task(conn: &mut PgConnection, task: Task) -> StoreResult<TaskWithFiles> {
    let status: TaskStatus = task_statuses::table
        .find(task.status_id)
        .select(TaskStatus::as_select())
        .first(conn)?;
    let file_ids: Vec<i32> = task_files::table
        .filter(task_files::task_id.eq(task.id))
        .order(task_files::file_id.asc())
        .select(task_files::file_id)
        .load(conn)?;
    Ok(TaskWithFiles {
        task,
        status,
        file_ids,
    })
}

impl MembershipStore for PgStore {
    fn find_chat(&self, chat_id: Uuid) -> StoreResult<Option<Chat>> {
        let mut conn = self.conn()?;
        let chat = chats::table
            .find(chat_id)
            .select(Chat::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(chat)
    }

    fn list_user_chats(&self, user_id: Uuid) -> StoreResult<Vec<Chat>> {
        let mut conn = self.conn()?;
        let rows = chats::table
            .inner_join(chat_users::table)
            .filter(chat_users::user_id.eq(user_id))
            .order(chats::created_at.desc())
            .select(Chat::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    fn create_chat(&self, chat: &NewChat, members: &[ChatUser]) -> StoreResult<()> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::insert_into(chats::table)
                .values(chat)
                .execute(conn)
                .map_err(classify)?;
            diesel::insert_into(chat_users::table)
                .values(members)
                .execute(conn)
                .map_err(classify)?;
            Ok(())
        })
    }

    fn update_chat(&self, chat: &Chat, added: &[ChatUser], removed: &[Uuid]) -> StoreResult<()> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let changeset = ChatChangeset {
                name: &chat.name,
                description: chat.description.as_deref(),
                avatar_file_id: chat.avatar_file_id,
            };
            diesel::update(chats::table.find(chat.id))
                .set(&changeset)
                .execute(conn)?;

            if !added.is_empty() {
                diesel::insert_into(chat_users::table)
                    .values(added)
                    .execute(conn)
                    .map_err(classify)?;
            }

            if !removed.is_empty() {
                diesel::delete(
                    chat_users::table
                        .filter(chat_users::chat_id.eq(chat.id))
                        .filter(chat_users::user_id.eq_any(removed)),
                )
                .execute(conn)?;
            }
            Ok(())
        })
    }

    fn delete_chat(&self, chat_id: Uuid) -> StoreResult<()> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let chat_messages = messages::table
                .filter(messages::chat_id.eq(chat_id))
                .select(messages::id);
            diesel::delete(message_files::table.filter(message_files::message_id.eq_any(chat_messages)))
                .execute(conn)?;
            diesel::delete(messages::table.filter(messages::chat_id.eq(chat_id))).execute(conn)?;
            diesel::delete(chat_users::table.filter(chat_users::chat_id.eq(chat_id)))
                .execute(conn)?;
            diesel::delete(chats::table.find(chat_id)).execute(conn)?;
            Ok(())
        })
    }

    fn find_membership(&self, chat_id: Uuid, user_id: Uuid) -> StoreResult<Option<Membership>> {
        let mut conn = self.conn()?;
        let row: Option<(ChatUser, ChatRole)> = chat_users::table
            .inner_join(chat_roles::table)
            .filter(chat_users::chat_id.eq(chat_id))
            .filter(chat_users::user_id.eq(user_id))
            .select((ChatUser::as_select(), ChatRole::as_select()))
            .first(&mut conn)
            .optional()?;

        match row {
            Some((chat_user, role)) => Ok(Some(Membership {
                chat_id: chat_user.chat_id,
                user_id: chat_user.user_id,
                role: with_permissions(&mut conn, role)?,
            })),
            None => Ok(None),
        }
    }

    fn list_members(&self, chat_id: Uuid) -> StoreResult<Vec<Member>> {
        let mut conn = self.conn()?;
        let rows: Vec<(Uuid, i32, String)> = chat_users::table
            .inner_join(chat_roles::table)
            .filter(chat_users::chat_id.eq(chat_id))
            .order((chat_users::role_id.asc(), chat_users::user_id.asc()))
            .select((chat_users::user_id, chat_users::role_id, chat_roles::name))
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(user_id, role_id, role_name)| Member {
                user_id,
                role_id,
                role_name,
            })
            .collect())
    }

    fn set_member_role(&self, chat_id: Uuid, user_id: Uuid, role_id: i32) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            chat_users::table
                .filter(chat_users::chat_id.eq(chat_id))
                .filter(chat_users::user_id.eq(user_id)),
        )
        .set(chat_users::role_id.eq(role_id))
        .execute(&mut conn)
        .map_err(classify)?;
        Ok(updated > 0)
    }
}

impl RoleStore for PgStore {
    fn find_role(&self, role_id: i32) -> StoreResult<Option<RoleWithPermissions>> {
        let mut conn = self.conn()?;
        let role: Option<ChatRole> = chat_roles::table
            .find(role_id)
            .select(ChatRole::as_select())
            .first(&mut conn)
            .optional()?;
        role.map(|role| with_permissions(&mut conn, role)).transpose()
    }

    fn find_role_by_name(&self, name: &str) -> StoreResult<Option<RoleWithPermissions>> {
        let mut conn = self.conn()?;
        let role: Option<ChatRole> = chat_roles::table
            .filter(chat_roles::name.eq(name))
            .select(ChatRole::as_select())
            .first(&mut conn)
            .optional()?;
        role.map(|role| with_permissions(&mut conn, role)).transpose()
    }

    fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>> {
        let mut conn = self.conn()?;
        let roles: Vec<ChatRole> = chat_roles::table
            .order(chat_roles::id.asc())
            .select(ChatRole::as_select())
            .load(&mut conn)?;
        let role_ids: Vec<i32> = roles.iter().map(|role| role.id).collect();
        let mut grouped = load_permissions(&mut conn, &role_ids)?;

        Ok(roles
            .into_iter()
            .map(|role| RoleWithPermissions {
                permissions: grouped.remove(&role.id).unwrap_or_default(),
                id: role.id,
                name: role.name,
            })
            .collect())
    }

    fn create_role(&self, name: &str, permission_ids: &[i32]) -> StoreResult<RoleWithPermissions> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let role: ChatRole = diesel::insert_into(chat_roles::table)
                .values(chat_roles::name.eq(name))
                .returning(ChatRole::as_returning())
                .get_result(conn)
                .map_err(classify)?;

            let links: Vec<_> = permission_ids
                .iter()
                .map(|permission_id| {
                    (
                        chat_role_permissions::chat_role_id.eq(role.id),
                        chat_role_permissions::chat_permission_id.eq(*permission_id),
                    )
                })
                .collect();
            if !links.is_empty() {
                diesel::insert_into(chat_role_permissions::table)
                    .values(&links)
                    .execute(conn)
                    .map_err(classify)?;
            }

            with_permissions(conn, role)
        })
    }

    fn delete_role(&self, role_id: i32) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(chat_roles::table.find(role_id))
            .execute(&mut conn)
            .map_err(classify)?;
        Ok(deleted > 0)
    }

    fn set_role_permissions(&self, role_id: i32, permission_ids: &[i32]) -> StoreResult<()> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::delete(
                chat_role_permissions::table
                    .filter(chat_role_permissions::chat_role_id.eq(role_id)),
            )
            .execute(conn)?;

            let links: Vec<_> = permission_ids
                .iter()
                .map(|permission_id| {
                    (
                        chat_role_permissions::chat_role_id.eq(role_id),
                        chat_role_permissions::chat_permission_id.eq(*permission_id),
                    )
                })
                .collect();
            if !links.is_empty() {
                diesel::insert_into(chat_role_permissions::table)
                    .values(&links)
                    .execute(conn)
                    .map_err(classify)?;
            }
            Ok(())
        })
    }

    fn find_permission(&self, permission_id: i32) -> StoreResult<Option<ChatPermission>> {
        let mut conn = self.conn()?;
        let permission = chat_permissions::table
            .find(permission_id)
            .select(ChatPermission::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(permission)
    }

    fn list_permissions(&self) -> StoreResult<Vec<ChatPermission>> {
        let mut conn = self.conn()?;
        let rows = chat_permissions::table
            .order(chat_permissions::id.asc())
            .select(ChatPermission::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    fn create_permission(&self, name: &str) -> StoreResult<ChatPermission> {
        let mut conn = self.conn()?;
        diesel::insert_into(chat_permissions::table)
            .values(chat_permissions::name.eq(name))
            .returning(ChatPermission::as_returning())
            .get_result(&mut conn)
            .map_err(classify)
    }

    fn delete_permission(&self, permission_id: i32) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(chat_permissions::table.find(permission_id))
            .execute(&mut conn)
            .map_err(classify)?;
        Ok(deleted > 0)
    }
}

impl MessageStore for PgStore {
    fn create_message(
        &self,
        message: &NewMessage,
        file_ids: &[i32],
    ) -> StoreResult<MessageWithFiles> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            diesel::insert_into(messages::table)
                .values(message)
                .execute(conn)
                .map_err(classify)?;

            let files: Vec<MessageFile> = file_ids
                .iter()
                .map(|file_id| MessageFile {
                    message_id: message.id,
                    file_id: *file_id,
                })
                .collect();
            if !files.is_empty() {
                diesel::insert_into(message_files::table)
                    .values(&files)
                    .execute(conn)
                    .map_err(classify)?;
            }

            let stored: Message = messages::table
                .find(message.id)
                .select(Message::as_select())
                .first(conn)?;
            let mut grouped = load_message_files(conn, &[message.id])?;
            Ok(MessageWithFiles {
                file_ids: grouped.remove(&stored.id).unwrap_or_default(),
                message: stored,
            })
        })
    }

    fn chat_messages(&self, chat_id: Uuid, page: Page) -> StoreResult<Vec<MessageWithFiles>> {
        let mut conn = self.conn()?;
        let rows: Vec<Message> = messages::table
            .filter(messages::chat_id.eq(chat_id))
            .order(messages::created_at.desc())
            .limit(page.limit)
            .offset(page.offset)
            .select(Message::as_select())
            .load(&mut conn)?;

        let ids: Vec<Uuid> = rows.iter().map(|message| message.id).collect();
        let mut grouped = load_message_files(&mut conn, &ids)?;

        Ok(rows
            .into_iter()
            .map(|message| MessageWithFiles {
                file_ids: grouped.remove(&message.id).unwrap_or_default(),
                message,
            })
            .collect())
    }

    fn search_messages(
        &self,
        chat_id: Uuid,
        query: &str,
        page: Page,
    ) -> StoreResult<(Vec<Message>, i64)> {
        let mut conn = self.conn()?;
        let pattern = format!("%{}%", escape_like(query));

        let total: i64 = messages::table
            .filter(messages::chat_id.eq(chat_id))
            .filter(messages::content.ilike(&pattern))
            .count()
            .get_result(&mut conn)?;

        let rows = messages::table
            .filter(messages::chat_id.eq(chat_id))
            .filter(messages::content.ilike(&pattern))
            .order(messages::created_at.desc())
            .limit(page.limit)
            .offset(page.offset)
            .select(Message::as_select())
            .load(&mut conn)?;

        Ok((rows, total))
    }
}

impl TaskStore for PgStore {
    fn find_status(&self, status_id: i32) -> StoreResult<Option<TaskStatus>> {
        let mut conn = self.conn()?;
        let status = task_statuses::table
            .find(status_id)
            .select(TaskStatus::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(status)
    }

    fn find_status_by_name(&self, name: &str) -> StoreResult<Option<TaskStatus>> {
        let mut conn = self.conn()?;
        let status = task_statuses::table
            .filter(task_statuses::name.eq(name))
            .select(TaskStatus::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(status)
    }

    fn list_statuses(&self) -> StoreResult<Vec<TaskStatus>> {
        let mut conn = self.conn()?;
        let rows = task_statuses::table
            .order(task_statuses::id.asc())
            .select(TaskStatus::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    fn create_status(&self, name: &str) -> StoreResult<TaskStatus> {
        let mut conn = self.conn()?;
        diesel::insert_into(task_statuses::table)
            .values(task_statuses::name.eq(name))
            .returning(TaskStatus::as_returning())
            .get_result(&mut conn)
            .map_err(classify)
    }

    fn delete_status(&self, status_id: i32) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(task_statuses::table.find(status_id))
            .execute(&mut conn)
            .map_err(classify)?;
        Ok(deleted > 0)
    }

    fn create_task(&self, task: &NewTask, file_ids: &[i32]) -> StoreResult<TaskWithFiles> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            let stored: Task = diesel::insert_into(tasks::table)
                .values(task)
                .returning(Task::as_returning())
                .get_result(conn)
                .map_err(classify)?;

            let files: Vec<TaskFile> = file_ids
                .iter()
                .map(|file_id| TaskFile {
                    task_id: stored.id,
                    file_id: *file_id,
                })
                .collect();
            if !files.is_empty() {
                diesel::insert_into(task_files::table)
                    .values(&files)
                    .execute(conn)
                    .map_err(classify)?;
            }

            load_task(conn, stored)
        })
    }

    fn update_task_status(&self, task_id: i32, status_id: i32) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let updated = diesel::update(tasks::table.find(task_id))
            .set(tasks::status_id.eq(status_id))
            .execute(&mut conn)
            .map_err(classify)?;
        Ok(updated > 0)
    }

    fn find_task(&self, task_id: i32) -> StoreResult<Option<TaskWithFiles>> {
        let mut conn = self.conn()?;
        let task: Option<Task> = tasks::table
            .find(task_id)
            .select(Task::as_select())
            .first(&mut conn)
            .optional()?;
        task.map(|task| load_task(&mut conn, task)).transpose()
    }

    fn executor_tasks(&self, user_id: Uuid, page: Page) -> StoreResult<Vec<TaskListEntry>> {
        let mut conn = self.conn()?;
        let rows = tasks::table
            .inner_join(task_statuses::table)
            .filter(tasks::executor_id.eq(user_id))
            .order((tasks::created_at.desc(), tasks::id.desc()))
            .limit(page.limit)
            .offset(page.offset)
            .select((
                tasks::id,
                tasks::title,
                task_statuses::name,
                tasks::created_at,
            ))
            .load::<TaskListEntry>(&mut conn)?;
        Ok(rows)
    }
}

use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use blogicum_client::{
    AuthResponse, BlogClient, BlogClientError, Comment, Post, PostDetail, PostInput, PostPage,
    ProfileInput, ProfilePage,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

const TOKEN_FILE: &str = ".blogicum_token";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "BLOGICUM_SERVER";

#[derive(Debug, Parser)]
#[command(name = "blogicum-cli", version, about = "CLI клиент для blogicum-server")]
struct Cli {
    /// Адрес сервера; по умолчанию берётся из BLOGICUM_SERVER.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать ответы сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя по логину или email.
    Login {
        #[arg(long, visible_alias = "username")]
        login: String,
        #[arg(long)]
        password: String,
    },
    /// Забыть сохранённый токен.
    Logout,
    /// Лента опубликованных постов.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Пост с комментариями.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
        #[command(flatten)]
        fields: PostFields,
    },
    /// Обновление поста (только автор).
    ///
    /// Неуказанные поля берутся из текущей версии поста.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[command(flatten)]
        fields: PostFields,
    },
    /// Удаление поста вместе с комментариями (только автор).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Комментарии поста.
    Comments {
        #[arg(long)]
        post_id: i64,
    },
    /// Добавление комментария (требует токен).
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        text: String,
    },
    /// Изменение комментария (только автор).
    EditComment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        text: String,
    },
    /// Удаление комментария (только автор).
    DeleteComment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        id: i64,
    },
    /// Опубликованные категории.
    Categories,
    /// Посты категории.
    Category {
        #[arg(long)]
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Опубликованные местоположения.
    Locations,
    /// Профиль автора и его посты.
    Profile {
        #[arg(long)]
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Изменение собственного профиля (требует токен).
    EditProfile {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Args)]
struct PostFields {
    /// Ссылка на изображение.
    #[arg(long)]
    image: Option<String>,
    /// Дата публикации в RFC 3339, например 2030-01-01T10:00:00Z.
    #[arg(long)]
    pub_date: Option<DateTime<Utc>>,
    /// Сохранить как черновик (снять с публикации).
    #[arg(long, conflicts_with = "publish")]
    draft: bool,
    /// Опубликовать.
    #[arg(long)]
    publish: bool,
    #[arg(long)]
    category_id: Option<i64>,
    #[arg(long)]
    location_id: Option<i64>,
}

impl PostFields {
    fn is_published(&self) -> Option<bool> {
        match (self.draft, self.publish) {
            (true, _) => Some(false),
            (_, true) => Some(true),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let mut client = BlogClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .blogicum_token")? {
        client.set_token(token);
    }
    let out = Output { json: cli.json };

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            out.show(&auth, |auth| print_auth("Регистрация успешна", auth))?;
        }
        Command::Login { login, password } => {
            let auth = client
                .login(&login, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            out.show(&auth, |auth| print_auth("Вход выполнен", auth))?;
        }
        Command::Logout => {
            client.clear_token();
            remove_token().context("не удалось удалить токен")?;
            println!("Токен удалён");
        }
        Command::List { page } => {
            let page = client.list_posts(page).await.map_err(map_client_error)?;
            out.show(&page, |page| print_page("Лента", page))?;
        }
        Command::Get { id } => {
            let detail = client.get_post(id).await.map_err(map_client_error)?;
            out.show(&detail, print_detail)?;
        }
        Command::Create {
            title,
            text,
            fields,
        } => {
            let input = PostInput {
                title,
                text,
                image: fields.image.clone(),
                pub_date: fields.pub_date,
                is_published: fields.is_published(),
                category_id: fields.category_id,
                location_id: fields.location_id,
            };
            let post = client
                .create_post(&input)
                .await
                .map_err(map_client_error)?;
            out.show(&post, |post| print_post("Пост создан", post))?;
        }
        Command::Update {
            id,
            title,
            text,
            fields,
        } => {
            let current = client.get_post(id).await.map_err(map_client_error)?;
            let input = merge_update(&current.post, title, text, &fields);
            let post = client
                .update_post(id, &input)
                .await
                .map_err(map_client_error)?;
            out.show(&post, |post| print_post("Пост обновлён", post))?;
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::Comments { post_id } => {
            let comments = client
                .list_comments(post_id)
                .await
                .map_err(map_client_error)?;
            out.show(&comments, |comments| print_comments(comments))?;
        }
        Command::Comment { post_id, text } => {
            let comment = client
                .add_comment(post_id, &text)
                .await
                .map_err(map_client_error)?;
            out.show(&comment, |comment| print_comment("Комментарий добавлен", comment))?;
        }
        Command::EditComment { post_id, id, text } => {
            let comment = client
                .update_comment(post_id, id, &text)
                .await
                .map_err(map_client_error)?;
            out.show(&comment, |comment| print_comment("Комментарий изменён", comment))?;
        }
        Command::DeleteComment { post_id, id } => {
            client
                .delete_comment(post_id, id)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
        }
        Command::Categories => {
            let categories = client.list_categories().await.map_err(map_client_error)?;
            out.show(&categories, |categories| {
                for category in categories {
                    println!("- [{}] {} ({})", category.id, category.title, category.slug);
                }
            })?;
        }
        Command::Category { slug, page } => {
            let listing = client
                .category_posts(&slug, page)
                .await
                .map_err(map_client_error)?;
            out.show(&listing, |listing| {
                print_page(&format!("Категория «{}»", listing.category.title), &listing.posts)
            })?;
        }
        Command::Locations => {
            let locations = client.list_locations().await.map_err(map_client_error)?;
            out.show(&locations, |locations| {
                for location in locations {
                    println!("- [{}] {}", location.id, location.name);
                }
            })?;
        }
        Command::Profile { username, page } => {
            let profile = client
                .get_profile(&username, page)
                .await
                .map_err(map_client_error)?;
            out.show(&profile, print_profile)?;
        }
        Command::EditProfile {
            username,
            email,
            first_name,
            last_name,
        } => {
            let input = ProfileInput {
                username,
                email,
                first_name,
                last_name,
            };
            let user = client
                .update_profile(&input)
                .await
                .map_err(map_client_error)?;
            out.show(&user, |user| {
                println!("Профиль обновлён");
                println!("username: {}", user.username);
                println!("email: {}", user.email);
                println!("name: {} {}", user.first_name, user.last_name);
            })?;
        }
    }

    Ok(())
}

struct Output {
    json: bool,
}

impl Output {
    fn show<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            let raw = serde_json::to_string_pretty(value).context("не удалось сформировать JSON")?;
            println!("{raw}");
        } else {
            human(value);
        }
        Ok(())
    }
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .filter(|server| !server.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string());
    normalize_server(raw.trim().to_string())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn merge_update(
    current: &Post,
    title: Option<String>,
    text: Option<String>,
    fields: &PostFields,
) -> PostInput {
    PostInput {
        title: title.unwrap_or_else(|| current.title.clone()),
        text: text.unwrap_or_else(|| current.text.clone()),
        image: fields.image.clone().or_else(|| current.image.clone()),
        pub_date: Some(fields.pub_date.unwrap_or(current.pub_date)),
        is_published: Some(fields.is_published().unwrap_or(current.is_published)),
        category_id: fields
            .category_id
            .or_else(|| current.category.as_ref().map(|category| category.id)),
        location_id: fields
            .location_id
            .or_else(|| current.location.as_ref().map(|location| location.id)),
    }
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &BlogClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::AuthenticationRequired => {
            "требуется авторизация: выполните `blogicum-cli login ...` или `blogicum-cli register ...`"
                .to_string()
        }
        BlogClientError::PermissionDenied(message) => format!("доступ запрещён: {message}"),
        BlogClientError::NotFound => "ресурс не найден".to_string(),
        BlogClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BlogClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.access_token);
    println!("expires_in: {}s", auth.expires_in);
    println!("user:");
    println!("  id: {}", auth.user.id);
    println!("  username: {}", auth.user.username);
    println!("  email: {}", auth.user.email);
    println!("  created_at: {}", auth.user.created_at);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("text: {}", post.text);
    println!("author: {}", post.author_username);
    println!("pub_date: {}", post.pub_date);
    println!("is_published: {}", post.is_published);
    if let Some(category) = &post.category {
        println!("category: {} ({})", category.title, category.slug);
    }
    if let Some(location) = &post.location {
        println!("location: {}", location.name);
    }
    if let Some(image) = &post.image {
        println!("image: {image}");
    }
    println!("updated_at: {}", post.updated_at);
}

fn print_detail(detail: &PostDetail) {
    print_post("Пост", &detail.post);
    println!("Комментариев: {}", detail.comment_count);
    print_comments(&detail.comments);
}

fn print_comment(title: &str, comment: &Comment) {
    println!("{title}");
    println!("id: {}", comment.id);
    println!("post_id: {}", comment.post_id);
    println!("author: {}", comment.author_username);
    println!("text: {}", comment.text);
}

fn print_comments(comments: &[Comment]) {
    for comment in comments {
        println!(
            "- [{}] {} ({}): {}",
            comment.id, comment.author_username, comment.created_at, comment.text
        );
    }
}

fn print_page(title: &str, page: &PostPage) {
    println!(
        "{title}: страница {} из {} (постов всего: {})",
        page.page, page.num_pages, page.total
    );

    for summary in &page.posts {
        println!(
            "- [{}] {} (автор: {}, комментариев: {})",
            summary.post.id, summary.post.title, summary.post.author_username, summary.comment_count
        );
    }
}

fn print_profile(page: &ProfilePage) {
    let profile = &page.profile;
    println!("Профиль {}", profile.username);
    println!("name: {} {}", profile.first_name, profile.last_name);
    println!("registered: {}", profile.created_at);
    if page.is_owner {
        println!("(это ваш профиль: показаны также черновики и отложенные посты)");
    }
    print_page("Посты", &page.posts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogicum_client::PostCategory;
    use chrono::TimeZone;

    fn sample_post() -> Post {
        let at = Utc
            .timestamp_opt(1_700_000_000, 0)
            .single()
            .expect("valid ts");
        Post {
            id: 1,
            title: "old title".to_string(),
            text: "old text".to_string(),
            image: None,
            pub_date: at,
            is_published: false,
            author_id: 2,
            author_username: "writer".to_string(),
            category: Some(PostCategory {
                id: 3,
                title: "Travel".to_string(),
                slug: "travel".to_string(),
            }),
            location: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8080".to_string());
        assert_eq!(s, "https://example.com:8080");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8080".to_string());
        assert_eq!(s, "http://127.0.0.1:8080");
    }

    #[test]
    fn resolve_server_prefers_flag_then_env_then_default() {
        assert_eq!(resolve_server(None, None), DEFAULT_HTTP_SERVER);
        assert_eq!(
            resolve_server(None, Some("env.host:1".to_string())),
            "http://env.host:1"
        );
        assert_eq!(
            resolve_server(Some("flag.host:2".to_string()), Some("env.host:1".to_string())),
            "http://flag.host:2"
        );
    }

    #[test]
    fn update_keeps_current_values_for_missing_fields() {
        let current = sample_post();
        let input = merge_update(
            &current,
            Some("new title".to_string()),
            None,
            &PostFields::default(),
        );

        assert_eq!(input.title, "new title");
        assert_eq!(input.text, "old text");
        assert_eq!(input.pub_date, Some(current.pub_date));
        assert_eq!(input.is_published, Some(false));
        assert_eq!(input.category_id, Some(3));
        assert_eq!(input.location_id, None);
    }

    #[test]
    fn publish_flags_map_to_is_published() {
        let draft = PostFields {
            draft: true,
            ..PostFields::default()
        };
        let publish = PostFields {
            publish: true,
            ..PostFields::default()
        };
        assert_eq!(draft.is_published(), Some(false));
        assert_eq!(publish.is_published(), Some(true));
        assert_eq!(PostFields::default().is_published(), None);
    }

    #[test]
    fn cli_parses_create_with_schedule() {
        let cli = Cli::try_parse_from([
            "blogicum-cli",
            "create",
            "--title",
            "t",
            "--text",
            "x",
            "--pub-date",
            "2030-01-01T10:00:00Z",
            "--draft",
        ])
        .expect("arguments must parse");

        match cli.command {
            Command::Create { fields, .. } => {
                assert!(fields.pub_date.is_some());
                assert_eq!(fields.is_published(), Some(false));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_token_content_trims_whitespace() {
        let token = parse_token_content("  abc.def.ghi  ");
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn parse_token_content_rejects_blank() {
        let token = parse_token_content("   ");
        assert!(token.is_none());
    }
}

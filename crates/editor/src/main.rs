use editor::domain::a001_category::{CategoryEditorSession, HttpCategoryGateway};
use editor::shared::{config, tracing as logging};

/// Проверка схемы категории: загрузить с сервера (или из JSON-файла)
/// и вывести все нарушения правил.
///
/// Использование:
///   editor <category-id>
///   editor --file <path.json>
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::initialize()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = config::load_config()?;
    let history_limit = config.editor.history_limit;

    let (session, label) = match args.as_slice() {
        [flag, path] if flag == "--file" => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path, e))?;
            let category = contracts::domain::a001_category::Category::from_json(&json)
                .map_err(|e| anyhow::anyhow!("Invalid category JSON in {}: {}", path, e))?;
            (CategoryEditorSession::with_category(history_limit, category), path.clone())
        }
        [id] => {
            let gateway = HttpCategoryGateway::new(&config.api)?;
            tracing::info!("Checking category {} at {}", id, config.api.base_url);
            let mut session = CategoryEditorSession::new(history_limit);
            session.load(&gateway, id).await?;
            (session, format!("category {}", id))
        }
        _ => anyhow::bail!("Usage: editor <category-id> | editor --file <path.json>"),
    };

    let category = session.category();
    tracing::info!(
        "{}: \"{}\", {} step(s), {} sub-category(ies)",
        label,
        category.category_name,
        category.steps.len(),
        category.sub_categories.len()
    );

    let violations = session.violations();
    if violations.is_empty() {
        println!("{}: OK", label);
        return Ok(());
    }

    for violation in &violations {
        println!("{}: {}", label, violation);
    }
    anyhow::bail!("{} validation error(s) in {}", violations.len(), label)
}

//! monday.com GraphQL client.
//!
//! All calls are blocking POSTs of `{"query", "variables"}` to the API URL.
//! Values always travel as GraphQL variables; nothing user-provided is
//! spliced into query text.

use super::{BoardColumn, BoardError, BoardGroup, BoardSink, BoardSnapshot, BoardSource};
use crate::Result;
use crate::models::RawItem;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// Default monday.com API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// Default page size for item pagination.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Largest page size the API accepts.
pub const MAX_PAGE_LIMIT: u32 = 500;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ITEM_FIELDS: &str = "
      cursor
      items {
        id
        name
        group { id title }
        column_values { id type text value }
      }";

#[derive(Debug, Deserialize)]
struct ItemsPage {
    cursor: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct BoardPayload {
    id: String,
    name: String,
    #[serde(default)]
    groups: Vec<BoardGroup>,
    #[serde(default)]
    columns: Vec<BoardColumn>,
    items_page: Option<ItemsPage>,
}

#[derive(Debug, Deserialize)]
struct BoardsData {
    boards: Vec<BoardPayload>,
}

#[derive(Debug, Deserialize)]
struct NextPageData {
    next_items_page: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreateItemData {
    create_item: IdOnly,
}

#[derive(Debug, Deserialize)]
struct CreateUpdateData {
    create_update: IdOnly,
}

/// Blocking client for one monday.com board.
pub struct MondayClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
    board_id: u64,
    page_limit: u32,
}

impl MondayClient {
    /// Create a client for `board_id`, authenticating with `token`.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>, board_id: u64, page_limit: u32) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            api_url: api_url.into(),
            token: token.into(),
            board_id,
            page_limit: page_limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn board_id(&self) -> u64 {
        self.board_id
    }

    /// Run a GraphQL operation and return its `data` member.
    fn gql(&self, query: &str, variables: Value) -> std::result::Result<Value, BoardError> {
        let body = json!({ "query": query, "variables": variables });

        let response = self
            .agent
            .post(&self.api_url)
            .set("Authorization", &self.token)
            .set("API-Version", "2024-10")
            .send_json(body);

        let payload: Value = match response {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| BoardError::Parse(e.to_string()))?,
            Err(ureq::Error::Status(401, _)) => return Err(BoardError::Unauthorized),
            Err(ureq::Error::Status(403, _)) => return Err(BoardError::Forbidden),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(BoardError::Http(format!("HTTP {}: {}", code, body)));
            }
            Err(e) => return Err(BoardError::Http(e.to_string())),
        };

        check_errors(payload)
    }

    fn gql_as<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let data = self.gql(query, variables)?;
        serde_json::from_value(data).map_err(|e| BoardError::Parse(e.to_string()).into())
    }

    fn fetch_first_page(&self) -> Result<BoardPayload> {
        let query = format!(
            "query ($board: [ID!], $limit: Int!) {{
  boards(ids: $board) {{
    id
    name
    groups {{ id title }}
    columns {{ id title type }}
    items_page(limit: $limit) {{{}
    }}
  }}
}}",
            ITEM_FIELDS
        );
        let data: BoardsData = self.gql_as(
            &query,
            json!({ "board": [self.board_id.to_string()], "limit": self.page_limit }),
        )?;

        data.boards.into_iter().next().ok_or_else(|| {
            crate::Error::NotFound(format!("Board {} not found or not accessible", self.board_id))
        })
    }

    fn fetch_next_page(&self, cursor: &str) -> Result<ItemsPage> {
        let query = format!(
            "query ($limit: Int!, $cursor: String!) {{
  next_items_page(limit: $limit, cursor: $cursor) {{{}
  }}
}}",
            ITEM_FIELDS
        );
        let data: NextPageData =
            self.gql_as(&query, json!({ "limit": self.page_limit, "cursor": cursor }))?;
        Ok(data.next_items_page)
    }
}

impl BoardSource for MondayClient {
    fn load_board(&self) -> Result<BoardSnapshot> {
        let board = self.fetch_first_page()?;
        tracing::info!(board = %board.name, id = %board.id, "fetched board metadata");

        let (items, pages) =
            collect_items(board.items_page, |cursor| self.fetch_next_page(cursor))?;
        tracing::info!(items = items.len(), pages, "fetched board items");

        Ok(BoardSnapshot {
            id: board.id,
            name: board.name,
            groups: board.groups,
            columns: board.columns,
            items,
        })
    }
}

/// Follow `next_items_page` cursors until the API returns a null cursor.
///
/// Returns every item in page order and the number of pages read.
fn collect_items<F>(first: Option<ItemsPage>, mut fetch_next: F) -> Result<(Vec<RawItem>, usize)>
where
    F: FnMut(&str) -> Result<ItemsPage>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages = 0;
    if let Some(page) = first {
        items.extend(page.items);
        cursor = page.cursor;
        pages = 1;
    }

    while let Some(next) = cursor {
        let page = fetch_next(&next)?;
        items.extend(page.items);
        cursor = page.cursor;
        pages += 1;
    }
    Ok((items, pages))
}

impl BoardSink for MondayClient {
    fn set_status_label(&self, item_id: &str, column_id: &str, label: &str) -> Result<()> {
        let query = "mutation ($board: ID!, $item: ID!, $column: String!, $value: JSON!) {
  change_column_value(board_id: $board, item_id: $item, column_id: $column, value: $value) { id }
}";
        let value = json!({ "label": label }).to_string();
        self.gql(
            query,
            json!({
                "board": self.board_id.to_string(),
                "item": item_id,
                "column": column_id,
                "value": value,
            }),
        )?;
        tracing::debug!(item = item_id, column = column_id, label, "set status label");
        Ok(())
    }

    fn rename_item(&self, item_id: &str, name: &str) -> Result<()> {
        let query = "mutation ($board: ID!, $item: ID!, $values: JSON!) {
  change_multiple_column_values(board_id: $board, item_id: $item, column_values: $values) { id }
}";
        let values = json!({ "name": name }).to_string();
        self.gql(
            query,
            json!({ "board": self.board_id.to_string(), "item": item_id, "values": values }),
        )?;
        tracing::debug!(item = item_id, name, "renamed item");
        Ok(())
    }

    fn create_item(&self, group_id: &str, name: &str) -> Result<String> {
        let query = "mutation ($board: ID!, $group: String!, $name: String!) {
  create_item(board_id: $board, group_id: $group, item_name: $name) { id }
}";
        let data: CreateItemData = self.gql_as(
            query,
            json!({ "board": self.board_id.to_string(), "group": group_id, "name": name }),
        )?;
        tracing::debug!(item = %data.create_item.id, group = group_id, "created item");
        Ok(data.create_item.id)
    }

    fn create_update(&self, item_id: &str, body: &str) -> Result<String> {
        let query = "mutation ($item: ID!, $body: String!) {
  create_update(item_id: $item, body: $body) { id }
}";
        let data: CreateUpdateData =
            self.gql_as(query, json!({ "item": item_id, "body": body }))?;
        tracing::debug!(item = item_id, update = %data.create_update.id, "posted update");
        Ok(data.create_update.id)
    }
}

/// Turn a GraphQL response into its `data` member, surfacing `errors`.
fn check_errors(mut payload: Value) -> std::result::Result<Value, BoardError> {
    if let Some(errors) = payload.get("errors") {
        let pretty = serde_json::to_string_pretty(errors).unwrap_or_else(|_| errors.to_string());
        return Err(BoardError::GraphQl(pretty));
    }
    match payload.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => Err(BoardError::Parse("response has no data".to_string())),
        Some(data) => Ok(data),
    }
}

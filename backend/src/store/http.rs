use super::{RecordStore, StoreError};
use async_trait::async_trait;
use common::model::recipient::Recipient;
use common::model::row::{NaturalKey, Row};
use common::model::ChatId;
use common::requests::{DataQuery, UserQuery};
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// `RecordStore` backed by the json-server REST endpoints.
pub struct HttpRecordStore {
    http_client: Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    async fn get_list<T, Q>(&self, collection: &str, query: Option<&Q>) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self.http_client.get(self.url(collection));
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = check_status(request.send().await?).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    async fn post<B: Serialize + ?Sized>(&self, collection: &str, body: &B) -> Result<(), StoreError> {
        let response = self
            .http_client
            .post(self.url(collection))
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        debug!("Record stored in /{}", collection);
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn find_users_by_chat_id(&self, chat_id: ChatId) -> Result<Vec<Recipient>, StoreError> {
        self.get_list("users", Some(&UserQuery { chat_id })).await
    }

    async fn list_users(&self) -> Result<Vec<Recipient>, StoreError> {
        self.get_list::<Recipient, ()>("users", None).await
    }

    async fn insert_user(&self, recipient: &Recipient) -> Result<(), StoreError> {
        self.post("users", recipient).await
    }

    async fn find_data(&self, key: &NaturalKey) -> Result<Vec<Row>, StoreError> {
        self.get_list("data", Some(&DataQuery::from(key))).await
    }

    async fn insert_data(&self, row: &Row) -> Result<(), StoreError> {
        self.post("data", row).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::recipient::Role;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> HttpRecordStore {
        HttpRecordStore::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn find_users_filters_by_chat_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("chat_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "u1", "chat_id": 42, "first_name": "Vali", "phone_number": "998901234567", "role": "admin"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let users = store(&server).find_users_by_chat_id(42).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn find_data_sends_the_natural_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(query_param("user_full_name", "Aliyev Vali"))
            .and(query_param("month", "Yanvar"))
            .and(query_param("organization_name", "Toshkent IT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let key = NaturalKey {
            full_name: "Aliyev Vali".to_string(),
            month: "Yanvar".to_string(),
            organization: "Toshkent IT".to_string(),
        };
        assert!(store(&server).find_data(&key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_user_posts_the_registration_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(serde_json::json!({
                "chat_id": 7,
                "first_name": "Vali",
                "phone_number": "998901234567",
                "role": "user"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let recipient = Recipient {
            chat_id: 7,
            first_name: "Vali".to_string(),
            phone_number: "998901234567".to_string(),
            role: Role::User,
        };
        store(&server).insert_user(&recipient).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let row = Row::from_iter([("id", "r1")]);
        match store(&server).insert_data(&row).await {
            Err(StoreError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_store_is_a_request_error() {
        // Nothing listens on port 9 on the test host.
        let store = HttpRecordStore::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            store.list_users().await,
            Err(StoreError::Request(_))
        ));
    }
}

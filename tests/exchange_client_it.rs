// crates.io
use httpmock::prelude::*;
// self
use wmp_authenticator::{
	_preludet::*,
	auth::{AppId, AuthConfig, Secret},
	error::TransportError,
	exchange::{CodeExchangeClient, ExchangeOutcome, ExchangeRequest},
	http::ReqwestHttpClient,
};

const EXCHANGE_PATH: &str = "/sns/jscode2session";

fn client(server: &MockServer) -> CodeExchangeClient<ReqwestHttpClient> {
	let endpoint = Url::parse(&server.url(EXCHANGE_PATH))
		.expect("Mock exchange endpoint should parse successfully.");

	CodeExchangeClient::new(test_reqwest_http_client(), endpoint)
}

fn request(code: &str) -> ExchangeRequest {
	let config = AuthConfig::new(
		AppId::new("wx-exchange").expect("App identifier should be valid for exchange tests."),
		Secret::new("secret with spaces&symbols"),
	);

	ExchangeRequest::new(&config, code)
}

#[tokio::test]
async fn exchange_returns_raw_body_and_encodes_query() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(EXCHANGE_PATH)
				.query_param("appid", "wx-exchange")
				.query_param("secret", "secret with spaces&symbols")
				.query_param("js_code", "c/1+2")
				.query_param("grant_type", "authorization_code");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"openid\":\"o-1\",\"unionid\":\"u-1\"}");
		})
		.await;
	let body = client(&server)
		.exchange(&request("c/1+2"))
		.await
		.expect("Exchange against the mock endpoint should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(body, b"{\"openid\":\"o-1\",\"unionid\":\"u-1\"}".to_vec());
}

#[tokio::test]
async fn empty_code_is_forwarded_to_provider() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(EXCHANGE_PATH).query_param("js_code", "");
			then.status(200).body("{\"errcode\":40029,\"errmsg\":\"invalid code\"}");
		})
		.await;
	let outcome = client(&server).exchange_and_classify(&request("")).await;

	mock.assert_calls_async(1).await;

	let ExchangeOutcome::ProviderError { code, message } = outcome else {
		panic!("An empty code should come back as a provider error.");
	};

	assert_eq!(code, "40029");
	assert_eq!(message.as_deref(), Some("invalid code"));
}

#[tokio::test]
async fn non_success_status_is_transport_error_with_preview() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(EXCHANGE_PATH);
			then.status(502).body("bad gateway");
		})
		.await;
	let err = client(&server)
		.exchange(&request("code"))
		.await
		.expect_err("A 502 response should surface as a transport error.");

	mock.assert_calls_async(1).await;

	match err {
		TransportError::Status { status, body_preview } => {
			assert_eq!(status, 502);
			assert_eq!(body_preview, "bad gateway");
		},
		other => panic!("Expected a status error, got {other:?}."),
	}
}

#[tokio::test]
async fn classified_success_carries_both_identities() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(EXCHANGE_PATH);
			then.status(200).body("{\"openid\":\"o-123\",\"unionid\":\"u-9\",\"session_key\":\"k\"}");
		})
		.await;
	let outcome = client(&server).exchange_and_classify(&request("code")).await;

	mock.assert_calls_async(1).await;

	let ExchangeOutcome::Success { open_id, union_id } = outcome else {
		panic!("A body with an openid should classify as success.");
	};

	assert_eq!(open_id.as_ref(), "o-123");
	assert_eq!(union_id.as_deref(), Some("u-9"));
}

#[tokio::test]
async fn connection_failure_is_network_error() {
	let endpoint = Url::parse("http://127.0.0.1:1/sns/jscode2session")
		.expect("Unreachable endpoint should parse successfully.");
	let client = CodeExchangeClient::<ReqwestHttpClient>::new(test_reqwest_http_client(), endpoint);
	let outcome = client.exchange_and_classify(&request("code")).await;

	assert!(matches!(
		outcome,
		ExchangeOutcome::TransportError { cause: TransportError::Network { .. } }
	));
}

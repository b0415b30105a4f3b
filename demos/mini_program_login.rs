//! Demonstrates a mini-program login against a stubbed code-to-session endpoint: the first
//! login creates a directory user, the second one binds the same user again.

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
use httpmock::prelude::*;
use url::Url;
// self
use wmp_authenticator::{
	auth::RealmId,
	directory::{MemoryDirectory, UserDirectory},
	flow::{Authenticator, WmpAuthenticator},
	http::ReqwestHttpClient,
	provider::ProviderDescriptor,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let exchange_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/jscode2session").query_param("appid", "wx-demo");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"openid\":\"o-demo\",\"unionid\":\"u-demo\",\"session_key\":\"k\"}");
		})
		.await;
	let descriptor = ProviderDescriptor::builder()
		.exchange_endpoint(Url::parse(&server.url("/sns/jscode2session"))?)
		.build()?;
	let backend = Arc::new(MemoryDirectory::default());
	let directory: Arc<dyn UserDirectory> = backend.clone();
	let authenticator = <WmpAuthenticator<ReqwestHttpClient>>::new(directory, descriptor);
	let realm = RealmId::new("demo-realm")?;
	let settings = HashMap::from([
		("id".to_owned(), "wx-demo".to_owned()),
		("secret".to_owned(), "demo-secret".to_owned()),
	]);

	for code in ["first-login-code", "second-login-code"] {
		let outcome = authenticator.run_with_settings(&realm, Some(&settings), code).await;
		let user = outcome
			.user()
			.ok_or_else(|| eyre!("Login was not bound: {:?}.", outcome.failure()))?;

		println!("Bound user {} (username {}).", user.id, user.username);
	}

	let missing = authenticator.authenticate(&realm, None, "third-login-code").await;

	println!("Without configuration the attempt ends as {:?}.", missing.failure());
	println!("Directory holds {} user(s).", backend.user_count(&realm));

	exchange_mock.assert_calls_async(2).await;

	Ok(())
}

//! User account surface.

// self
use crate::{
	_prelude::*,
	api,
	facade::Sdk,
	http::{ApiRequest, SdkHttpClient},
	oauth::TransportErrorMapper,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Profile of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Stable user identifier assigned by the identity provider.
	pub id: String,
	/// Email address, when the user has shared one.
	#[serde(default)]
	pub email: Option<String>,
	/// Public display name.
	#[serde(default)]
	pub username: Option<String>,
}

impl<C, M> Sdk<C, M>
where
	C: ?Sized + SdkHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the signed-in user's profile.
	pub async fn current_user(&self) -> Result<UserProfile> {
		const KIND: CallKind = CallKind::Login;
		const PATH: &str = "users/me";

		let span = CallSpan::new(KIND, "current_user");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let bearer = self.bearer().await?;
				let url = api::api_url(&self.descriptor, PATH, &[])?;

				api::execute_json(self, ApiRequest::get(url).with_bearer(bearer), PATH).await
			})
			.await;

		api::record_result(KIND, &result);

		result
	}
}

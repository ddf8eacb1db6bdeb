// self
use crate::{
	_prelude::*,
	project::{ProjectDescriptor, ProjectEndpoints, ProjectId, ProjectQuirks},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProjectDescriptorError {
	/// Authorization endpoint is required for the login flow.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for code exchanges and refreshes.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// API base endpoint is mandatory for storefront calls.
	#[error("Missing API endpoint.")]
	MissingApiEndpoint,
	/// Client identifier must be provided.
	#[error("Client identifier cannot be empty.")]
	MissingClientId,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Page limit must allow at least one item per page.
	#[error("Page limit must be greater than zero.")]
	ZeroPageLimit,
}

/// Builder for [`ProjectDescriptor`] values.
#[derive(Debug)]
pub struct ProjectDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProjectId,
	/// OAuth client identifier used for login and refresh grants.
	pub client_id: Option<String>,
	/// Authorization endpoint used by the login flow.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for exchanges and refreshes.
	pub token_endpoint: Option<Url>,
	/// Base URL for backend API calls.
	pub api_endpoint: Option<Url>,
	/// Project-specific quirks.
	pub quirks: ProjectQuirks,
}
impl ProjectDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProjectId) -> Self {
		Self {
			id,
			client_id: None,
			authorization_endpoint: None,
			token_endpoint: None,
			api_endpoint: None,
			quirks: ProjectQuirks::default(),
		}
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the API base endpoint.
	///
	/// The URL is used as a join base for request paths; a trailing slash is
	/// enforced during [`build`](Self::build) so relative joins never replace the
	/// final path segment.
	pub fn api_endpoint(mut self, url: Url) -> Self {
		self.api_endpoint = Some(url);

		self
	}

	/// Overrides the project quirks.
	pub fn quirks(mut self, quirks: ProjectQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProjectDescriptor, ProjectDescriptorError> {
		let client_id = self.client_id.ok_or(ProjectDescriptorError::MissingClientId)?;

		if client_id.is_empty() {
			return Err(ProjectDescriptorError::MissingClientId);
		}

		let authorization = self
			.authorization_endpoint
			.ok_or(ProjectDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProjectDescriptorError::MissingTokenEndpoint)?;
		let api = normalize_api_base(self.api_endpoint.ok_or(ProjectDescriptorError::MissingApiEndpoint)?);
		let endpoints = ProjectEndpoints { authorization, token, api };
		let descriptor =
			ProjectDescriptor { id: self.id, client_id, endpoints, quirks: self.quirks };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProjectDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProjectDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("api", &self.endpoints.api)?;

		if self.quirks.page_limit == 0 {
			return Err(ProjectDescriptorError::ZeroPageLimit);
		}

		Ok(())
	}
}

fn normalize_api_base(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}

// Loopback hosts may use plain HTTP for local development and tests.
fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProjectDescriptorError> {
	if url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url)) {
		Ok(())
	} else {
		Err(ProjectDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain == "localhost",
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

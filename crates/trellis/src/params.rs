//! Parameter descriptors and the provider table that binds them.
//!
//! Each handler declares an ordered list of [`ParamSpec`]s once, at
//! registration. On every invocation the [`ParameterResolver`] looks up a
//! provider for each descriptor, calls it with the invocation context and
//! hands the resulting [`Params`] to the handler.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::arguments::CommandArguments;
use crate::completion::CompleterHelper;
use crate::error::FrameworkError;

type BoxedValue = Box<dyn Any + Send>;
type DefaultParser = fn(&str) -> Result<BoxedValue, String>;

/// A registered provider: invocation context in, optional value out.
pub type Provider = Arc<dyn Fn(&CommandArguments) -> Option<BoxedValue> + Send + Sync>;

/// Lookup key used for a type when no explicit key is declared.
pub fn type_key<T: ?Sized>() -> &'static str {
	std::any::type_name::<T>()
}

fn parse_boxed<T>(text: &str) -> Result<BoxedValue, String>
where
	T: FromStr + Send + 'static,
	T::Err: fmt::Display,
{
	text.parse::<T>()
		.map(|value| Box::new(value) as BoxedValue)
		.map_err(|e| e.to_string())
}

/// Descriptor for one handler parameter.
#[derive(Clone)]
pub struct ParamSpec {
	key: Option<String>,
	type_name: &'static str,
	type_id: TypeId,
	default: Option<String>,
	default_parser: Option<DefaultParser>,
	optional: bool,
}

impl ParamSpec {
	/// A parameter of type `T` looked up by its type key.
	///
	/// `T` has no from-text constructor registered, so a default value on
	/// this descriptor is a configuration error at resolution time.
	pub fn of<T: Any + Send>() -> Self {
		Self {
			key: None,
			type_name: type_key::<T>(),
			type_id: TypeId::of::<T>(),
			default: None,
			default_parser: None,
			optional: false,
		}
	}

	/// A parameter of type `T` whose default text is parsed with `FromStr`.
	pub fn parsed<T>() -> Self
	where
		T: FromStr + Send + 'static,
		T::Err: fmt::Display,
	{
		Self {
			default_parser: Some(parse_boxed::<T>),
			..Self::of::<T>()
		}
	}

	/// Look the provider up under `key` instead of the type key.
	pub fn named(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Text used when the provider yields nothing.
	pub fn default_value(mut self, text: impl Into<String>) -> Self {
		self.default = Some(text.into());
		self
	}

	/// Allow the parameter to stay unbound.
	pub fn optional(mut self) -> Self {
		self.optional = true;
		self
	}

	pub fn lookup_key(&self) -> &str {
		self.key.as_deref().unwrap_or(self.type_name)
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn is_optional(&self) -> bool {
		self.optional
	}

	fn parse_default(&self) -> Option<Result<BoxedValue, FrameworkError>> {
		let text = self.default.as_deref()?;
		let Some(parser) = self.default_parser else {
			return Some(Err(FrameworkError::DefaultUnsupported {
				type_name: self.type_name.to_string(),
			}));
		};
		Some(parser(text).map_err(|reason| FrameworkError::InvalidDefault {
			value: text.to_string(),
			type_name: self.type_name.to_string(),
			reason,
		}))
	}
}

impl fmt::Debug for ParamSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ParamSpec")
			.field("key", &self.lookup_key())
			.field("type", &self.type_name)
			.field("default", &self.default)
			.field("optional", &self.optional)
			.finish()
	}
}

/// Values bound for one invocation, in declaration order.
#[derive(Default)]
pub struct Params {
	values: Vec<Option<BoxedValue>>,
}

impl Params {
	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Whether the parameter at `index` was bound.
	pub fn is_bound(&self, index: usize) -> bool {
		matches!(self.values.get(index), Some(Some(_)))
	}

	pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
		self.values.get(index)?.as_ref()?.downcast_ref::<T>()
	}

	/// Move the value at `index` out, leaving the slot unbound.
	pub fn take<T: Any>(&mut self, index: usize) -> Option<T> {
		let slot = self.values.get_mut(index)?;
		match slot.take()?.downcast::<T>() {
			Ok(value) => Some(*value),
			Err(original) => {
				*slot = Some(original);
				None
			}
		}
	}
}

impl fmt::Debug for Params {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.values.iter().map(|v| v.is_some()))
			.finish()
	}
}

/// Append-only table of parameter providers.
pub struct ParameterResolver {
	providers: HashMap<String, Provider>,
}

impl Default for ParameterResolver {
	fn default() -> Self {
		Self::new()
	}
}

impl ParameterResolver {
	/// A resolver with the built-in [`CompleterHelper`] provider.
	pub fn new() -> Self {
		let mut providers: HashMap<String, Provider> = HashMap::new();
		providers.insert(
			type_key::<CompleterHelper>().to_string(),
			Arc::new(|args: &CommandArguments| {
				Some(Box::new(CompleterHelper::new(args)) as BoxedValue)
			}),
		);
		Self { providers }
	}

	/// Register `provider` under `key`. Keys can be registered only once.
	pub fn add_provider<T, F>(&mut self, key: impl Into<String>, provider: F) -> Result<(), FrameworkError>
	where
		T: Any + Send,
		F: Fn(&CommandArguments) -> Option<T> + Send + Sync + 'static,
	{
		let key = key.into();
		if self.providers.contains_key(&key) {
			return Err(FrameworkError::DuplicateProvider { key });
		}
		self.providers.insert(
			key,
			Arc::new(move |args: &CommandArguments| {
				provider(args).map(|value| Box::new(value) as BoxedValue)
			}),
		);
		Ok(())
	}

	/// Register `provider` under the type key of `T`.
	pub fn add_type_provider<T, F>(&mut self, provider: F) -> Result<(), FrameworkError>
	where
		T: Any + Send,
		F: Fn(&CommandArguments) -> Option<T> + Send + Sync + 'static,
	{
		self.add_provider(type_key::<T>(), provider)
	}

	pub fn has_provider(&self, key: &str) -> bool {
		self.providers.contains_key(key)
	}

	/// Bind every descriptor in `specs` for the invocation `args`.
	///
	/// `handler` names the declaring handler in error messages.
	pub fn resolve(
		&self,
		handler: &str,
		specs: &[ParamSpec],
		args: &CommandArguments,
	) -> Result<Params, FrameworkError> {
		let mut values = Vec::with_capacity(specs.len());

		for spec in specs {
			let key = spec.lookup_key();
			let provider = self.providers.get(key).ok_or_else(|| match &spec.key {
				Some(explicit) => FrameworkError::MissingKeyedProvider {
					key: explicit.clone(),
					handler: handler.to_string(),
					type_name: spec.type_name.to_string(),
				},
				None => FrameworkError::MissingTypeProvider {
					type_name: spec.type_name.to_string(),
					handler: handler.to_string(),
				},
			})?;

			let mut value = provider(args);

			if let Some(bound) = &value {
				if (**bound).type_id() != spec.type_id {
					return Err(FrameworkError::ProviderTypeMismatch {
						key: key.to_string(),
						expected: spec.type_name.to_string(),
						handler: handler.to_string(),
					});
				}
			}

			if value.is_none() {
				value = spec.parse_default().transpose()?;
			}

			if value.is_none() && !spec.optional {
				return Err(FrameworkError::MissingValue {
					key: key.to_string(),
					type_name: spec.type_name.to_string(),
					handler: handler.to_string(),
				});
			}

			values.push(value);
		}

		Ok(Params { values })
	}
}

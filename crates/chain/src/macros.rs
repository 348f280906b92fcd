//! Declarative macros for argument vectors and typed interface stubs.

/// Builds an [`ArgumentVector`](crate::ArgumentVector) from values convertible
/// into `serde_json::Value`.
///
/// ```
/// let args = chain::arguments!["store_1", 42, true];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! arguments {
    () => {
        $crate::ArgumentVector::empty()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::ArgumentVector::from_values(vec![$($crate::Value::from($value)),+])
    };
}

/// Declares an interface as a typed stub over [`FluentProxy`](crate::FluentProxy).
///
/// Each operation is either `fluent` (returns another declared interface) or
/// `terminal` (dispatches and returns the dispatcher's output). Parameters are
/// listed by name; every argument is converted into a `serde_json::Value`.
///
/// ```ignore
/// fluent_interface! {
///     pub struct StoreApi {
///         terminal fn get(id);
///         fluent fn products(store_id) -> ProductApi;
///     }
/// }
///
/// fluent_interface! {
///     pub struct ProductApi {
///         terminal fn get(product_id);
///     }
/// }
///
/// let api = StoreApi::target(Arc::new(dispatcher))?;
/// let product = api.products("store_1")?.get("product_1").await?;
/// ```
///
/// The generated struct is generic over the dispatcher and also provides
/// `target` (build the contract and root stand-in) and `as_proxy`.
#[macro_export]
macro_rules! fluent_interface {
    (@method [$(#[$meta:meta])*] fluent $op:ident ($($param:ident),*) -> $ret:ident) => {
        $(#[$meta])*
        pub fn $op(&self, $($param: impl Into<$crate::Value>),*) -> Result<$ret<D>, D::Error> {
            self.proxy
                .fluent(
                    stringify!($op),
                    $crate::ArgumentVector::from_values(vec![$($param.into()),*]),
                )
                .map(<$ret<D> as $crate::Interface<D>>::bind)
        }
    };
    (@method [$(#[$meta:meta])*] terminal $op:ident ($($param:ident),*)) => {
        $(#[$meta])*
        pub async fn $op(
            &self,
            $($param: impl Into<$crate::Value>),*
        ) -> Result<D::Output, D::Error> {
            self.proxy
                .terminal(
                    stringify!($op),
                    $crate::ArgumentVector::from_values(vec![$($param.into()),*]),
                )
                .await
        }
    };

    (@register $contract:ident terminal) => {};
    (@register $contract:ident fluent $ret:ident) => {
        <$ret<D> as $crate::Interface<D>>::register($contract)?;
    };

    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$op_attr:meta])*
                $kind:ident fn $op:ident ( $($param:ident),* $(,)? ) $(-> $ret:ident)? ;
            )*
        }
    ) => {
        $(#[$attr])*
        $vis struct $name<D: $crate::Dispatcher> {
            proxy: $crate::FluentProxy<D>,
        }

        impl<D: $crate::Dispatcher> $name<D> {
            /// Builds the contract rooted at this interface and returns its
            /// root stand-in.
            pub fn target(dispatcher: ::std::sync::Arc<D>) -> Result<Self, $crate::ChainError> {
                $crate::target::<Self, D>(dispatcher)
            }

            /// The untyped stand-in behind this interface.
            pub fn as_proxy(&self) -> &$crate::FluentProxy<D> {
                &self.proxy
            }

            $(
                $crate::fluent_interface!(
                    @method [$(#[$op_attr])*] $kind $op ($($param),*) $(-> $ret)?
                );
            )*
        }

        impl<D: $crate::Dispatcher> $crate::Interface<D> for $name<D> {
            const NAME: &'static str = stringify!($name);

            fn register(contract: &mut $crate::ContractBuilder) -> Result<(), $crate::ChainError> {
                if contract.contains(Self::NAME) {
                    return Ok(());
                }

                let shape = $crate::InterfaceShape::builder(Self::NAME)
                    $( .$kind(stringify!($op), &[$(stringify!($param)),*] $(, stringify!($ret))?) )*
                    .build()?;
                contract.insert(shape)?;

                $(
                    $crate::fluent_interface!(@register contract $kind $($ret)?);
                )*
                Ok(())
            }

            fn bind(proxy: $crate::FluentProxy<D>) -> Self {
                Self { proxy }
            }
        }

        impl<D: $crate::Dispatcher> Clone for $name<D> {
            fn clone(&self) -> Self {
                Self {
                    proxy: self.proxy.clone(),
                }
            }
        }

        impl<D: $crate::Dispatcher> ::std::fmt::Debug for $name<D> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.proxy).finish()
            }
        }
    };
}

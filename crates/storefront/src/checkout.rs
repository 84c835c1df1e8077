//! Checkout flow: validated, exactly-once-per-click order submission.
//!
//! A short-lived state machine that turns the current cart into a
//! submitted order. Validation gates submission and short-circuits on the
//! first failing check; submission deep-copies the cart so later cart
//! mutations never touch the submitted order. Each submit call performs at
//! most one create-order write, with no automatic retry.

use std::time::Duration;

use chrono::Utc;
use tamarind_core::{Email, LocalOrderId};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::backend::{Backend, BackendError, ClientInfo, OrderDraft, OrderRecord};
use crate::cart::CartStore;
use crate::notice::Notice;

/// Default deadline for the create-order call.
///
/// Without one, a hung request would leave the form disabled forever.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// A contact form field, for pinpointing validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Address,
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
            Self::Address => write!(f, "address"),
        }
    }
}

/// User-correctable problems found before submission.
///
/// Surfaced inline next to the form; never logged as a system fault.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A required contact field is empty after trimming.
    #[error("please fill in your {0}")]
    MissingField(ContactField),

    /// The email does not look like `local@domain.tld`.
    #[error("please enter a valid email address")]
    BadEmail,

    /// There is nothing in the cart to order.
    #[error("your cart is empty")]
    EmptyCart,
}

/// The editable contact form backing the checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl ContactForm {
    /// Clear all fields (after a successful submission).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Run the ordered validation checks against this form and the cart.
    ///
    /// Check order is fixed: empty contact fields first (name, email,
    /// phone, address), then email shape, then cart non-emptiness. The
    /// first failing check wins.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`].
    pub fn validate(&self, cart: &CartStore) -> Result<ClientInfo, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let address = self.address.trim();

        for (value, field) in [
            (name, ContactField::Name),
            (email, ContactField::Email),
            (phone, ContactField::Phone),
            (address, ContactField::Address),
        ] {
            if value.is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let email = Email::parse(email).map_err(|_| ValidationError::BadEmail)?;

        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        Ok(ClientInfo {
            name: name.to_owned(),
            email,
            phone: phone.to_owned(),
            address: address.to_owned(),
        })
    }
}

/// Observable state of the checkout flow.
///
/// `Submitting` means form inputs are disabled; everything else is `Idle`
/// with the form editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
}

/// Result of one submit attempt.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// The backend acknowledged the order; the cart was cleared and the
    /// form reset.
    Placed {
        /// The locally recorded order.
        order: OrderRecord,
    },
    /// Validation failed before any backend call; form and cart untouched.
    Rejected {
        /// The first failing check.
        error: ValidationError,
    },
    /// The backend call failed; form values and cart are preserved so the
    /// shopper can re-attempt.
    Failed {
        /// What went wrong.
        error: BackendError,
    },
}

impl CheckoutOutcome {
    /// The banner to surface for this outcome.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Placed { .. } => Notice::success("Your order has been placed!"),
            Self::Rejected { error } => Notice::error(error.to_string()),
            Self::Failed { .. } => {
                Notice::error("We couldn't place your order. Please try again.")
            }
        }
    }

    /// Whether the order was placed.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

/// The checkout state machine.
#[derive(Debug)]
pub struct CheckoutFlow {
    form: ContactForm,
    state: CheckoutState,
    submit_timeout: Duration,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_TIMEOUT)
    }
}

impl CheckoutFlow {
    /// Create a flow with the given submission deadline.
    #[must_use]
    pub const fn new(submit_timeout: Duration) -> Self {
        Self {
            form: ContactForm {
                name: String::new(),
                email: String::new(),
                phone: String::new(),
                address: String::new(),
            },
            state: CheckoutState::Idle,
            submit_timeout,
        }
    }

    /// The contact form, for display.
    #[must_use]
    pub const fn form(&self) -> &ContactForm {
        &self.form
    }

    /// The contact form, for editing while `Idle`.
    pub const fn form_mut(&mut self) -> &mut ContactForm {
        &mut self.form
    }

    /// Current machine state.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// Attempt to submit the current cart as an order.
    ///
    /// Runs the ordered validation checks; on success performs exactly one
    /// create-order call with a deep copy of the cart, bounded by the
    /// submission deadline. On an acknowledged write the cart is cleared
    /// and the form reset; on any failure both are preserved. The flow
    /// always returns to `Idle`.
    #[instrument(skip_all)]
    pub async fn submit<B: Backend>(
        &mut self,
        cart: &mut CartStore,
        backend: &B,
    ) -> CheckoutOutcome {
        let client = match self.form.validate(cart) {
            Ok(client) => client,
            Err(error) => return CheckoutOutcome::Rejected { error },
        };

        self.state = CheckoutState::Submitting;

        let draft = OrderDraft {
            local_id: LocalOrderId::new(Uuid::new_v4().to_string()),
            client,
            items: cart.lines().to_vec(),
            total: cart.totals().subtotal,
            timestamp: Utc::now(),
        };

        let result =
            tokio::time::timeout(self.submit_timeout, backend.create_order(draft.clone())).await;

        self.state = CheckoutState::Idle;

        match result {
            Ok(Ok(id)) => {
                cart.clear();
                self.form.reset();
                tracing::info!(order_id = %id, "order placed");
                CheckoutOutcome::Placed {
                    order: OrderRecord::placed(id, draft),
                }
            }
            Ok(Err(error)) => {
                tracing::error!(error = %error, "order submission failed");
                CheckoutOutcome::Failed { error }
            }
            Err(_) => {
                tracing::error!(timeout = ?self.submit_timeout, "order submission timed out");
                CheckoutOutcome::Failed {
                    error: BackendError::Timeout(self.submit_timeout),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::{CancellationRequest, OrderWatch, ProductFilters, ProductPage};
    use crate::cart::ProductSelection;
    use crate::notice::NoticeKind;
    use rust_decimal::dec;
    use std::sync::Mutex;
    use tamarind_core::{CurrencyCode, OrderId, Price, ProductId};

    /// Scripted backend for unit tests.
    #[derive(Default)]
    struct ScriptedBackend {
        fail: bool,
        hang: bool,
        created: Mutex<Vec<OrderDraft>>,
    }

    impl Backend for ScriptedBackend {
        async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, BackendError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(BackendError::Unavailable("scripted failure".to_owned()));
            }
            self.created.lock().unwrap().push(draft);
            Ok(OrderId::new("ord-1"))
        }

        async fn create_cancellation_request(
            &self,
            _request: CancellationRequest,
        ) -> Result<(), BackendError> {
            Ok(())
        }

        async fn query_products(
            &self,
            _filters: &ProductFilters,
        ) -> Result<ProductPage, BackendError> {
            Ok(ProductPage {
                products: Vec::new(),
                next_cursor: None,
            })
        }

        fn watch_order(&self, local_id: &tamarind_core::LocalOrderId) -> OrderWatch {
            OrderWatch::channel(local_id.clone()).0
        }
    }

    fn filled_form(flow: &mut CheckoutFlow) {
        let form = flow.form_mut();
        form.name = "Jo Shopper".to_owned();
        form.email = "jo@example.com".to_owned();
        form.phone = "555-0100".to_owned();
        form.address = "1 Main St".to_owned();
    }

    fn cart_with_item() -> CartStore {
        let mut cart = CartStore::new();
        cart.add_item(
            &crate::backend::Product {
                id: ProductId::new("A"),
                name: "Product A".to_owned(),
                price: Price::new(dec!(10), CurrencyCode::USD),
                image: None,
                category: None,
                sizes: Vec::new(),
                colors: Vec::new(),
            },
            ProductSelection::default(),
        );
        cart
    }

    #[tokio::test]
    async fn test_missing_field_beats_empty_cart() {
        // All fields empty AND empty cart: the missing-field error wins.
        let mut flow = CheckoutFlow::default();
        let mut cart = CartStore::new();
        let backend = ScriptedBackend::default();

        let outcome = flow.submit(&mut cart, &backend).await;
        match outcome {
            CheckoutOutcome::Rejected {
                error: ValidationError::MissingField(ContactField::Name),
            } => {}
            other => panic!("expected missing-name rejection, got {other:?}"),
        }
        assert!(backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_email_rejected_before_backend() {
        let mut flow = CheckoutFlow::default();
        filled_form(&mut flow);
        flow.form_mut().email = "not-an-email".to_owned();
        let mut cart = cart_with_item();
        let backend = ScriptedBackend::default();

        let outcome = flow.submit(&mut cart, &backend).await;
        assert!(matches!(
            outcome,
            CheckoutOutcome::Rejected {
                error: ValidationError::BadEmail
            }
        ));
        assert!(backend.created.lock().unwrap().is_empty());
        // Entered values survive a rejection.
        assert_eq!(flow.form().email, "not-an-email");
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_last() {
        let mut flow = CheckoutFlow::default();
        filled_form(&mut flow);
        let mut cart = CartStore::new();
        let backend = ScriptedBackend::default();

        let outcome = flow.submit(&mut cart, &backend).await;
        assert!(matches!(
            outcome,
            CheckoutOutcome::Rejected {
                error: ValidationError::EmptyCart
            }
        ));
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_resets_form() {
        let mut flow = CheckoutFlow::default();
        filled_form(&mut flow);
        let mut cart = cart_with_item();
        let backend = ScriptedBackend::default();

        let outcome = flow.submit(&mut cart, &backend).await;
        assert!(outcome.is_placed());
        assert!(cart.is_empty());
        assert_eq!(flow.form(), &ContactForm::default());
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert_eq!(outcome.notice().kind, NoticeKind::Success);
    }

    #[tokio::test]
    async fn test_failure_preserves_cart_and_form() {
        let mut flow = CheckoutFlow::default();
        filled_form(&mut flow);
        let mut cart = cart_with_item();
        let backend = ScriptedBackend {
            fail: true,
            ..Default::default()
        };

        let outcome = flow.submit(&mut cart, &backend).await;
        assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
        assert_eq!(cart.len(), 1);
        assert_eq!(flow.form().name, "Jo Shopper");
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert_eq!(outcome.notice().kind, NoticeKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_times_out() {
        let mut flow = CheckoutFlow::new(Duration::from_secs(5));
        filled_form(&mut flow);
        let mut cart = cart_with_item();
        let backend = ScriptedBackend {
            hang: true,
            ..Default::default()
        };

        let outcome = flow.submit(&mut cart, &backend).await;
        assert!(matches!(
            outcome,
            CheckoutOutcome::Failed {
                error: BackendError::Timeout(_)
            }
        ));
        // The flow is usable again, not wedged in Submitting.
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_isolated_from_later_cart_mutations() {
        let mut flow = CheckoutFlow::default();
        filled_form(&mut flow);
        let mut cart = cart_with_item();
        let backend = ScriptedBackend::default();

        let outcome = flow.submit(&mut cart, &backend).await;
        let CheckoutOutcome::Placed { order } = outcome else {
            panic!("expected placed order");
        };

        // Mutate the (now-cleared) cart; the submitted snapshot must not move.
        cart.add_item(
            &crate::backend::Product {
                id: ProductId::new("B"),
                name: "Product B".to_owned(),
                price: Price::new(dec!(99), CurrencyCode::USD),
                image: None,
                category: None,
                sizes: Vec::new(),
                colors: Vec::new(),
            },
            ProductSelection::default(),
        );

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items.first().unwrap().id.as_str(), "A");
        assert_eq!(order.total.amount, dec!(10));

        let sent = backend.created.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent.first().unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_only_field_is_missing() {
        let mut flow = CheckoutFlow::default();
        filled_form(&mut flow);
        flow.form_mut().phone = "   ".to_owned();
        let mut cart = cart_with_item();
        let backend = ScriptedBackend::default();

        let outcome = flow.submit(&mut cart, &backend).await;
        assert!(matches!(
            outcome,
            CheckoutOutcome::Rejected {
                error: ValidationError::MissingField(ContactField::Phone)
            }
        ));
    }
}

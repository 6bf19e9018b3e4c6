use graft_core_derive::injectable;
use std::sync::Arc;

pub struct UserRepository;
pub struct EmailService;

#[injectable]
pub struct UserService {
    #[inject]
    user_repo: Arc<UserRepository>,
    #[inject(name = "email")]
    email_service: Arc<EmailService>,
    sent: u64,
}

#[injectable]
pub struct Empty;

fn main() {
    let mut collection = graft_core::ServiceCollection::new();
    collection.add_transient::<UserService>().unwrap();
    collection.add_singleton::<Empty>().unwrap();
}

use derive_new::new;

#[derive(new)]
pub struct CreateToken {
    pub email: String,
    pub password: String,
}

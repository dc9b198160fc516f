mod helpers;
mod test_create;
mod test_update;

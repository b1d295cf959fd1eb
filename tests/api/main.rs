mod complete;
mod health_check;
mod helpers;

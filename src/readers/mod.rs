pub mod soliscloud;

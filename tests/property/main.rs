mod runnable;
